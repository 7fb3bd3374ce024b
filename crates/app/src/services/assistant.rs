//! Assistant: commands first, language model second.
//!
//! Every message goes through the [`CommandInterpreter`]. Only when no rule
//! matches is the language model consulted, either single-turn with a home
//! status preamble or multi-turn with a per-session history.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use relayhub_domain::chat::{ChatMessage, ConversationHistory};
use relayhub_domain::context;
use relayhub_domain::error::{RelayHubError, ValidationError};

use crate::ports::{LanguageModel, LanguageModelError, RelayStore, SensorSource, TimerRepository};
use crate::services::command_interpreter::CommandInterpreter;

pub const EMPTY_REPLY: &str = "Sorry, I couldn't think of a reply.";

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Command,
    Model,
    /// The model failed and a canned apology was returned.
    Fallback,
}

impl ReplySource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub source: ReplySource,
}

impl AssistantReply {
    fn new(text: impl Into<String>, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// User-facing apology for a model failure.
#[must_use]
pub fn fallback_message(err: &LanguageModelError, chat: bool) -> &'static str {
    match err {
        LanguageModelError::Unreachable(_) => {
            "Cannot connect to server. Make sure the language model proxy is running."
        }
        LanguageModelError::ModelUnavailable(_) => {
            "Ollama is not responding. Make sure it's running."
        }
        LanguageModelError::Timeout => "The AI is taking too long. Please try again.",
        LanguageModelError::Other(_) if chat => "Sorry, something went wrong with the chat!",
        LanguageModelError::Other(_) => "Sorry, something went wrong!",
    }
}

/// Sessions kept before the least recently used one is dropped.
pub const MAX_SESSIONS: usize = 256;

#[derive(Debug, Default)]
struct Session {
    history: ConversationHistory,
    last_used: u64,
}

#[derive(Debug, Default)]
struct SessionTable {
    entries: HashMap<Uuid, Session>,
    clock: u64,
}

impl SessionTable {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, session)| session.last_used)
            .map(|(id, _)| *id);
        if let Some(id) = oldest {
            self.entries.remove(&id);
            tracing::debug!(session = %id, "chat session evicted");
        }
    }
}

/// Conversation histories keyed by session id, at most `capacity` of them.
#[derive(Debug)]
pub struct ChatSessions {
    capacity: usize,
    table: Mutex<SessionTable>,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl ChatSessions {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            table: Mutex::default(),
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, SessionTable> {
        self.table
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append `message` and return the resulting history.
    ///
    /// Starting a new session while full drops the least recently used one.
    pub fn push(&self, session: Uuid, message: ChatMessage) -> Vec<ChatMessage> {
        let mut table = self.table();
        if !table.entries.contains_key(&session) && table.entries.len() >= self.capacity {
            table.evict_least_recent();
        }
        let now = table.tick();
        let entry = table.entries.entry(session).or_default();
        entry.last_used = now;
        entry.history.push(message);
        entry.history.messages()
    }

    #[must_use]
    pub fn history(&self, session: Uuid) -> Vec<ChatMessage> {
        self.table()
            .entries
            .get(&session)
            .map(|entry| entry.history.messages())
            .unwrap_or_default()
    }

    /// Drop a session, returning whether it existed.
    pub fn clear(&self, session: Uuid) -> bool {
        self.table().entries.remove(&session).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Assistant<T, S, Z, M> {
    interpreter: CommandInterpreter<T, S, Z>,
    model: M,
    sessions: ChatSessions,
}

impl<T, S, Z, M> Assistant<T, S, Z, M>
where
    T: TimerRepository,
    S: RelayStore,
    Z: SensorSource,
    M: LanguageModel,
{
    pub fn new(interpreter: CommandInterpreter<T, S, Z>, model: M) -> Self {
        Self {
            interpreter,
            model,
            sessions: ChatSessions::default(),
        }
    }

    #[must_use]
    pub fn interpreter(&self) -> &CommandInterpreter<T, S, Z> {
        &self.interpreter
    }

    #[must_use]
    pub fn sessions(&self) -> &ChatSessions {
        &self.sessions
    }

    /// Single-turn reply.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyMessage`] for blank input. Model and
    /// store failures are turned into fallback replies instead.
    #[tracing::instrument(skip(self))]
    pub async fn reply(&self, message: &str) -> Result<AssistantReply, RelayHubError> {
        let message = non_empty(message)?;
        if let Some(text) = self.interpreter.handle(message).await {
            return Ok(AssistantReply::new(text, ReplySource::Command));
        }

        let prompt = if context::is_casual(message) {
            tracing::debug!("casual message, skipping home status");
            message.to_string()
        } else {
            context::contextual_prompt(&self.home_status().await, message)
        };

        Ok(match self.model.generate(&prompt).await {
            Ok(text) => model_reply(text),
            Err(err) => {
                tracing::warn!(%err, "language model failed");
                AssistantReply::new(fallback_message(&err, false), ReplySource::Fallback)
            }
        })
    }

    /// Multi-turn reply within `session`.
    ///
    /// The user message is recorded before the model call; the model reply
    /// only on success.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyMessage`] for blank input.
    #[tracing::instrument(skip(self))]
    pub async fn chat(&self, session: Uuid, message: &str) -> Result<AssistantReply, RelayHubError> {
        let message = non_empty(message)?;
        if let Some(text) = self.interpreter.handle(message).await {
            return Ok(AssistantReply::new(text, ReplySource::Command));
        }

        let history = self.sessions.push(session, ChatMessage::user(message));
        tracing::debug!(messages = history.len(), "sending conversation");

        Ok(match self.model.chat(&history).await {
            Ok(text) => {
                let reply = model_reply(text);
                self.sessions
                    .push(session, ChatMessage::assistant(reply.text.clone()));
                reply
            }
            Err(err) => {
                tracing::warn!(%err, "language model chat failed");
                AssistantReply::new(fallback_message(&err, true), ReplySource::Fallback)
            }
        })
    }

    /// Home status block for the model, empty when the store cannot be read.
    async fn home_status(&self) -> String {
        let relays = self.interpreter.relays().states().await;
        let sensors = self.interpreter.status().snapshot().await;
        match (relays, sensors) {
            (Ok(relays), Ok(Some(sensors))) => context::home_status(&relays, &sensors),
            (Ok(_), Ok(None)) => String::new(),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(%err, "home status unavailable for prompt");
                String::new()
            }
        }
    }
}

fn non_empty(message: &str) -> Result<&str, ValidationError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyMessage)
    } else {
        Ok(trimmed)
    }
}

fn model_reply(text: String) -> AssistantReply {
    if text.trim().is_empty() {
        AssistantReply::new(EMPTY_REPLY, ReplySource::Model)
    } else {
        AssistantReply::new(text, ReplySource::Model)
    }
}
