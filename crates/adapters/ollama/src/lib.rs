//! # relayhub-adapter-ollama
//!
//! Client for the local proxy in front of Ollama. The proxy exposes
//! `POST /ollama` (`{model, prompt}` → `{response}`) and
//! `POST /ollama/chat` (`{model, messages}` → `{response}`).

mod client;

pub use client::{Config, DEFAULT_MODEL, OllamaClient};
