//! Wire models for the chat API.

pub mod chat;

pub use chat::{ChatRequest, ChatResponse, DEFAULT_LANGUAGE};
