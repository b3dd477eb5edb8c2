pub mod bootstrap;
pub mod chat;
pub mod metrics;
pub mod providers;

pub use bootstrap::{Bootstrap, ClientHandle};
pub use metrics::{get_metrics, init_metrics};
