//! Bot-engagement detection over clip stats histories.
//!
//! The engine ([`detect`]) is pure: it takes a newest-first history of
//! counter snapshots and a platform, applies nine anomaly rules against
//! platform-specific thresholds, and returns flags with a combined
//! confidence score. The async wrapper ([`run_bot_detection`]) fetches the
//! history from clip-service and publishes `stats.bot_detected` when a
//! significant flag fires.

pub mod growth;
pub mod pipeline;
pub mod result;
pub mod rules;
pub mod thresholds;

pub use pipeline::run_bot_detection;
pub use result::{BotDetectionResult, BotFlag, FlagKind, Severity};
pub use rules::detect;
pub use thresholds::{thresholds_for, PlatformThresholds};
