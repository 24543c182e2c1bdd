//! Application layer
//!
//! The two long-running flows share nothing but the [`ConfigStore`].

pub mod animation;
mod config_store;

pub use animation::{AnimationEngine, EngineMetrics, StopHandle, TickStats};
pub use config_store::ConfigStore;
