//! Consumer topology and dispatch loop.
//!
//! The queue is bound to the consumed routing keys with a dead-letter
//! exchange attached. Each delivery is decoded to an [`IncomingEvent`] and
//! handed to the dispatcher with a bounded retry; when retries are exhausted
//! the delivery is nacked without requeue so the broker dead-letters it.

use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, Connection, ExchangeKind};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::EventError;
use crate::incoming::IncomingEvent;

pub const QUEUE: &str = "statistics.events";
pub const DEAD_LETTER_EXCHANGE: &str = "clipdeck.events.dlx";
pub const DEAD_LETTER_QUEUE: &str = "statistics.events.dead";
pub const PREFETCH_COUNT: u16 = 10;

/// Retry policy applied to each delivery before it is dead-lettered.
#[derive(Debug, Clone, Copy)]
pub struct ConsumerOptions {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(250),
        }
    }
}

/// Declare the consumer queue, its bindings, and the dead-letter topology,
/// then set the channel prefetch.
///
/// # Errors
///
/// Returns [`EventError::Broker`] if any declaration fails.
pub async fn declare_topology(channel: &Channel, exchange: &str) -> Result<(), EventError> {
    let durable = ExchangeDeclareOptions {
        durable: true,
        ..ExchangeDeclareOptions::default()
    };

    channel
        .exchange_declare(exchange, ExchangeKind::Topic, durable, FieldTable::default())
        .await?;
    channel
        .exchange_declare(
            DEAD_LETTER_EXCHANGE,
            ExchangeKind::Topic,
            durable,
            FieldTable::default(),
        )
        .await?;

    let durable_queue = QueueDeclareOptions {
        durable: true,
        ..QueueDeclareOptions::default()
    };

    channel
        .queue_declare(DEAD_LETTER_QUEUE, durable_queue, FieldTable::default())
        .await?;
    channel
        .queue_bind(
            DEAD_LETTER_QUEUE,
            DEAD_LETTER_EXCHANGE,
            "#",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    let mut queue_args = FieldTable::default();
    queue_args.insert(
        "x-dead-letter-exchange".into(),
        AMQPValue::LongString(DEAD_LETTER_EXCHANGE.into()),
    );
    channel
        .queue_declare(QUEUE, durable_queue, queue_args)
        .await?;

    for key in crate::CONSUMED_KEYS {
        channel
            .queue_bind(
                QUEUE,
                exchange,
                key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
    }

    channel
        .basic_qos(PREFETCH_COUNT, BasicQosOptions::default())
        .await?;

    Ok(())
}

/// Consume from the queue until `shutdown` fires, dispatching each decoded
/// event to `handler`. Deliveries are handled on their own tasks, so up to
/// `PREFETCH_COUNT` messages can be in flight; in-flight handlers are drained
/// before this function returns.
///
/// # Errors
///
/// Returns [`EventError::Broker`] if the consume subscription cannot be set up.
pub async fn run_consumer<H, Fut, E>(
    conn: &Connection,
    exchange: &str,
    options: ConsumerOptions,
    handler: H,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), EventError>
where
    H: Fn(IncomingEvent) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let channel = conn.create_channel().await?;
    declare_topology(&channel, exchange).await?;

    let mut consumer = channel
        .basic_consume(
            QUEUE,
            crate::SERVICE_NAME,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    let mut in_flight: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("consumer shutting down — draining in-flight deliveries");
                break;
            }
            next = consumer.next() => match next {
                Some(Ok(delivery)) => {
                    let handler = handler.clone();
                    in_flight.spawn(handle_delivery(delivery, options, handler));
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "consumer stream error");
                }
                None => {
                    tracing::warn!("consumer stream closed by broker");
                    break;
                }
            }
        }
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}

async fn handle_delivery<H, Fut, E>(
    delivery: lapin::message::Delivery,
    options: ConsumerOptions,
    handler: H,
) where
    H: Fn(IncomingEvent) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send,
    E: std::fmt::Display,
{
    let routing_key = delivery.routing_key.as_str().to_string();

    let event = match IncomingEvent::decode(&routing_key, &delivery.data) {
        Ok(event) => event,
        Err(EventError::UnknownRoutingKey(key)) => {
            // A binding with no handler would park messages until DLQ for no
            // reason; ack and move on.
            tracing::warn!(routing_key = key, "no handler for routing key — acking");
            ack_or_log(&delivery).await;
            return;
        }
        Err(e) => {
            // Malformed payloads will not improve on redelivery.
            tracing::warn!(routing_key, error = %e, "undecodable event — dead-lettering");
            nack_or_log(&delivery).await;
            return;
        }
    };

    let outcome = attempt_with_retry(options, || handler(event.clone()), &routing_key).await;

    match outcome {
        Ok(()) => ack_or_log(&delivery).await,
        Err(e) => {
            tracing::error!(
                routing_key,
                error = %e,
                attempts = options.max_attempts,
                "handler failed after all attempts — dead-lettering"
            );
            nack_or_log(&delivery).await;
        }
    }
}

/// Run `operation` up to `max_attempts` times with exponential backoff
/// (`backoff_base * 2^attempt`) between failures.
async fn attempt_with_retry<F, Fut, E>(
    options: ConsumerOptions,
    mut operation: F,
    routing_key: &str,
) -> Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempt += 1;
                if attempt >= options.max_attempts {
                    return Err(e);
                }
                let delay = options.backoff_base * 2u32.saturating_pow(attempt - 1);
                tracing::warn!(
                    routing_key,
                    attempt,
                    max_attempts = options.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "handler failed — retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn ack_or_log(delivery: &lapin::message::Delivery) {
    if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
        tracing::error!(error = %e, "failed to ack delivery");
    }
}

async fn nack_or_log(delivery: &lapin::message::Delivery) {
    let options = BasicNackOptions {
        requeue: false,
        ..BasicNackOptions::default()
    };
    if let Err(e) = delivery.nack(options).await {
        tracing::error!(error = %e, "failed to nack delivery");
    }
}
