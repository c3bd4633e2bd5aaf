use async_trait::async_trait;
use chrono::Utc;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ExchangeKind};
use serde_json::json;

use crate::error::EventError;

/// Publish-side contract. The collector and the detection pipeline hold an
/// `Arc<dyn EventSink>` so tests can capture published events in memory.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, routing_key: &str, data: serde_json::Value) -> Result<(), EventError>;
}

/// AMQP publisher over one channel, bound to the topic exchange.
pub struct AmqpPublisher {
    channel: Channel,
    exchange: String,
}

impl AmqpPublisher {
    /// Create a channel and declare the (durable, topic) exchange.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Broker`] if the channel or exchange declaration
    /// fails.
    pub async fn new(conn: &Connection, exchange: &str) -> Result<Self, EventError> {
        let channel = conn.create_channel().await?;
        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(Self {
            channel,
            exchange: exchange.to_string(),
        })
    }
}

#[async_trait]
impl EventSink for AmqpPublisher {
    async fn publish(&self, routing_key: &str, data: serde_json::Value) -> Result<(), EventError> {
        let envelope = json!({
            "event": routing_key,
            "service": crate::SERVICE_NAME,
            "timestamp": Utc::now(),
            "data": data,
        });
        let body = serde_json::to_vec(&envelope)?;

        self.channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await?
            .await?;

        tracing::debug!(routing_key, "event published");
        Ok(())
    }
}
