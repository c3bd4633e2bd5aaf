use serde::Deserialize;

use crate::error::EventError;

/// A consumed delivery, decoded by routing key into a typed variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingEvent {
    ClipApproved(ClipEvent),
    ClipSubmitted(ClipEvent),
    StatsRequested(ClipEvent),
    CampaignCreated(CampaignCreated),
    CampaignStatusChanged(CampaignStatusChanged),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipEvent {
    pub clip_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCreated {
    pub campaign_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatusChanged {
    pub campaign_id: String,
    pub new_status: String,
}

impl IncomingEvent {
    /// Decode a delivery body for the given routing key.
    ///
    /// Accepts both enveloped bodies (`{event, service, timestamp, data}`)
    /// and bare payloads; when a `data` object is present it is the payload.
    ///
    /// # Errors
    ///
    /// - [`EventError::UnknownRoutingKey`] for keys outside the consumed set.
    /// - [`EventError::Payload`] when the body does not match the key's shape.
    pub fn decode(routing_key: &str, body: &[u8]) -> Result<Self, EventError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| EventError::Payload {
                routing_key: routing_key.to_string(),
                source: e,
            })?;
        let payload = value.get("data").cloned().unwrap_or(value);

        let wrap = |e: serde_json::Error| EventError::Payload {
            routing_key: routing_key.to_string(),
            source: e,
        };

        match routing_key {
            crate::CLIP_APPROVED => Ok(IncomingEvent::ClipApproved(
                serde_json::from_value(payload).map_err(wrap)?,
            )),
            crate::CLIP_SUBMITTED => Ok(IncomingEvent::ClipSubmitted(
                serde_json::from_value(payload).map_err(wrap)?,
            )),
            crate::STATS_REQUESTED => Ok(IncomingEvent::StatsRequested(
                serde_json::from_value(payload).map_err(wrap)?,
            )),
            crate::CAMPAIGN_CREATED => Ok(IncomingEvent::CampaignCreated(
                serde_json::from_value(payload).map_err(wrap)?,
            )),
            crate::CAMPAIGN_STATUS_CHANGED => Ok(IncomingEvent::CampaignStatusChanged(
                serde_json::from_value(payload).map_err(wrap)?,
            )),
            other => Err(EventError::UnknownRoutingKey(other.to_string())),
        }
    }

    /// The routing key this variant was decoded from.
    #[must_use]
    pub fn routing_key(&self) -> &'static str {
        match self {
            IncomingEvent::ClipApproved(_) => crate::CLIP_APPROVED,
            IncomingEvent::ClipSubmitted(_) => crate::CLIP_SUBMITTED,
            IncomingEvent::StatsRequested(_) => crate::STATS_REQUESTED,
            IncomingEvent::CampaignCreated(_) => crate::CAMPAIGN_CREATED,
            IncomingEvent::CampaignStatusChanged(_) => crate::CAMPAIGN_STATUS_CHANGED,
        }
    }
}
