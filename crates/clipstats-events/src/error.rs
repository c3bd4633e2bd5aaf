use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no handler for routing key {0}")]
    UnknownRoutingKey(String),

    #[error("malformed payload for {routing_key}: {source}")]
    Payload {
        routing_key: String,
        #[source]
        source: serde_json::Error,
    },
}
