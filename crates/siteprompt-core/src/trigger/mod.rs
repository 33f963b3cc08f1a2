mod config;
mod engine;
mod scroll;

pub use config::{ExitIntentConfig, TriggerConfig};
pub(crate) use config::default_excluded_path_prefixes;
pub use engine::{TriggerEngine, TriggerState};
pub use scroll::ScrollMetrics;
