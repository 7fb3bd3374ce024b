//! Chat messages and bounded conversation history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of messages kept per conversation.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// FIFO buffer of the most recent messages of one conversation.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<ChatMessage>,
    limit: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl ConversationHistory {
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Append a message, dropping the oldest ones past the limit.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.limit {
            self.messages.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Snapshot of the history, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_only_last_ten_messages() {
        let mut history = ConversationHistory::default();
        for i in 0..15 {
            history.push(ChatMessage::user(format!("m{i}")));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        let messages = history.messages();
        assert_eq!(messages[0].content, "m5");
        assert_eq!(messages[9].content, "m14");
    }

    #[test]
    fn should_clear_history() {
        let mut history = ConversationHistory::default();
        history.push(ChatMessage::assistant("hello"));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn should_serialize_role_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
