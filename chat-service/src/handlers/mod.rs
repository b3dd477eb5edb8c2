//! HTTP handlers for the chat service.

pub mod chat;
pub mod diagnostics;
pub mod health;
pub mod metrics;

pub use chat::chat;
pub use diagnostics::live_probe;
pub use health::health_check;
pub use metrics::{http_metrics_middleware, metrics_endpoint};
