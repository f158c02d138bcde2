pub mod config;
pub mod telemetry;

pub use config::{Config, LogConfig, RulesConfig, DEFAULT_TOLERANCE};
pub use telemetry::init_tracing;
