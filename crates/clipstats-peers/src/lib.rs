//! Typed HTTP clients for the service's internal peers.
//!
//! clip-service owns clip metadata and engagement histories; campaign-service
//! owns campaign metadata. Every outbound request carries the
//! `X-Internal-Service: statistics-service` header so peers can distinguish
//! internal traffic from the public edge.

pub mod campaign_service;
pub mod clip_service;
pub mod error;
pub mod types;

pub use campaign_service::CampaignServiceClient;
pub use clip_service::ClipServiceClient;
pub use error::PeerError;
pub use types::{Campaign, Clip, ClipAggregate, CampaignAggregate};

pub(crate) const INTERNAL_SERVICE_HEADER: &str = "X-Internal-Service";
pub(crate) const SERVICE_NAME: &str = "statistics-service";
