//! Event-bus integration: AMQP topic exchange, typed events, publisher and
//! consumer.
//!
//! Published messages wrap their payload in a small envelope
//! (`{event, service, timestamp, data}`). Consumed deliveries are decoded
//! into the [`IncomingEvent`] sum type by routing key, so handlers dispatch
//! on a tag instead of destructuring loose JSON.

pub mod consumer;
pub mod error;
pub mod incoming;
pub mod publisher;
pub mod types;

pub use consumer::{declare_topology, run_consumer, ConsumerOptions};
pub use error::EventError;
pub use incoming::IncomingEvent;
pub use publisher::{AmqpPublisher, EventSink};
pub use types::{BotDetected, StatsUpdated};

/// Routing keys this service publishes.
pub const STATS_UPDATED: &str = "stats.updated";
pub const STATS_BOT_DETECTED: &str = "stats.bot_detected";

/// Routing keys the consumer queue is bound to.
pub const CLIP_SUBMITTED: &str = "clip.submitted";
pub const CLIP_APPROVED: &str = "clip.approved";
pub const STATS_REQUESTED: &str = "stats.requested";
pub const CAMPAIGN_CREATED: &str = "campaign.created";
pub const CAMPAIGN_STATUS_CHANGED: &str = "campaign.status_changed";

pub const CONSUMED_KEYS: [&str; 5] = [
    CLIP_SUBMITTED,
    CLIP_APPROVED,
    STATS_REQUESTED,
    CAMPAIGN_CREATED,
    CAMPAIGN_STATUS_CHANGED,
];

pub const SERVICE_NAME: &str = "statistics-service";
