//! chat-service: forwards coding questions to Gemini and hosts the chat frontend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
