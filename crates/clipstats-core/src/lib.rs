//! Shared configuration and domain types for the clipdeck statistics service.
//!
//! Holds the environment-driven [`AppConfig`], the [`Platform`] enum, and the
//! counter tuples ([`PlatformStats`], [`StatsHistoryEntry`]) exchanged between
//! the platform adapters, the stats cache, and the bot-detection engine.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod platform;
pub mod stats;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platform::{Platform, UnknownPlatform};
pub use stats::{PlatformStats, StatsHistoryEntry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
