//! Durable-queue consumer: connection lifecycle and manual-ack delivery loop.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties, Consumer};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::data_plane::dispatcher::Dispatcher;
use crate::error::RelayError;
use crate::observability::{events, fields};

const COMPONENT: &str = "queue_consumer";

/// Minimum delay between reconnect attempts (seconds).
const BACKOFF_BASE_SECS: u64 = 5;
/// Maximum delay between reconnect attempts (seconds).
const BACKOFF_MAX_SECS: u64 = 300;
/// Maximum number of connect attempts per outage before giving up.
const MAX_ATTEMPTS: u32 = 10;
/// Jitter fraction applied to each delay (±10 %).
const JITTER_FRACTION: f64 = 0.10;

/// Owns the single consumption stream for the event queue.
///
/// The consumer declares the queue durable, consumes with manual
/// acknowledgment and bounded prefetch, and hands every delivery to the
/// dispatcher inside a fault-isolating boundary: whatever the dispatch
/// outcome, the message is acknowledged, so a malformed event is dropped
/// once instead of redelivered forever. Deliveries are processed strictly
/// in broker order; nothing runs in parallel on this stream.
pub struct QueueConsumer {
    config: RelayConfig,
    dispatcher: Arc<Dispatcher>,
}

impl QueueConsumer {
    pub fn new(config: RelayConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Runs the consume loop.
    ///
    /// A channel failure mid-consume re-enters the backoff loop against a
    /// fresh connection; redelivered messages are handled again under
    /// at-least-once semantics. Returns only when the broker stays
    /// unreachable past the reconnect budget. The caller logs the error
    /// and the process stays up without consumption until restarted.
    pub async fn run(&self) -> Result<(), RelayError> {
        loop {
            let (_connection, mut consumer) = self.connect_with_backoff().await?;

            info!(
                event = events::CONSUME_STARTED,
                component = COMPONENT,
                queue = %self.config.queue,
                prefetch = self.config.prefetch,
                "consuming"
            );

            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(err) => {
                        error!(
                            event = events::CHANNEL_FAILED,
                            component = COMPONENT,
                            queue = %self.config.queue,
                            err = %err,
                            "channel failed while consuming"
                        );
                        break;
                    }
                };

                let outcome = self.dispatcher.handle(&delivery.data).await;
                debug!(
                    event = events::DELIVERY_DISPATCHED,
                    component = COMPONENT,
                    queue = %self.config.queue,
                    redelivered = delivery.redelivered,
                    outcome = ?outcome,
                    "delivery dispatched"
                );

                // Acknowledge on any outcome: room delivery is best-effort
                // and dispatch failures are non-retryable.
                if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
                    warn!(
                        event = events::DELIVERY_ACK_FAILED,
                        component = COMPONENT,
                        queue = %self.config.queue,
                        err = %err,
                        "unable to acknowledge delivery"
                    );
                }
            }

            warn!(
                event = events::CONSUME_HALTED,
                component = COMPONENT,
                queue = %self.config.queue,
                "delivery stream ended, reconnecting"
            );
        }
    }

    /// Connects, declares the queue, and opens the delivery stream, retrying
    /// with exponential backoff and ±10 % jitter.
    ///
    /// Schedule: 5 s → 10 s → 20 s → … → 300 s (cap), up to [`MAX_ATTEMPTS`]
    /// tries per outage.
    async fn connect_with_backoff(&self) -> Result<(Connection, Consumer), RelayError> {
        let mut delay_secs = BACKOFF_BASE_SECS;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.start_consumer().await {
                Ok(started) => {
                    info!(
                        event = events::BROKER_CONNECTED,
                        component = COMPONENT,
                        attempt,
                        broker = %fields::redact_url(&self.config.broker_url),
                        "broker connected"
                    );
                    return Ok(started);
                }
                Err(err) if attempt == MAX_ATTEMPTS => {
                    error!(
                        event = events::BROKER_CONNECT_FAILED,
                        component = COMPONENT,
                        attempt,
                        broker = %fields::redact_url(&self.config.broker_url),
                        err = %err,
                        "broker unreachable, giving up"
                    );
                    return Err(RelayError::BrokerUnavailable {
                        attempts: MAX_ATTEMPTS,
                        last_error: err,
                    });
                }
                Err(err) => {
                    let total = delay_secs + jitter_secs(delay_secs);
                    warn!(
                        event = events::BROKER_RETRY,
                        component = COMPONENT,
                        attempt,
                        max = MAX_ATTEMPTS,
                        broker = %fields::redact_url(&self.config.broker_url),
                        err = %err,
                        retry_after_secs = total,
                        "broker connect failed, retrying with backoff"
                    );
                    sleep(Duration::from_secs(total)).await;
                    delay_secs = (delay_secs * 2).min(BACKOFF_MAX_SECS);
                }
            }
        }

        // Unreachable: the loop always returns inside the match arms above.
        unreachable!("backoff loop exited without returning")
    }

    async fn start_consumer(&self) -> Result<(Connection, Consumer), lapin::Error> {
        let connection =
            Connection::connect(&self.config.broker_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        channel
            .basic_qos(self.config.prefetch, BasicQosOptions::default())
            .await?;

        let queue = channel
            .queue_declare(
                &self.config.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        info!(
            event = events::QUEUE_DECLARED,
            component = COMPONENT,
            queue = %self.config.queue,
            backlog = queue.message_count(),
            "queue declared durable"
        );

        let consumer_tag = format!("dishpatch-realtime-{}", Uuid::new_v4());
        let consumer = channel
            .basic_consume(
                &self.config.queue,
                &consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        Ok((connection, consumer))
    }
}

/// Jitter offset (0 … `JITTER_FRACTION * base_secs`) as integer seconds,
/// derived from the current clock to avoid a rand dependency.
fn jitter_secs(base_secs: u64) -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);

    let max_jitter = ((base_secs as f64) * JITTER_FRACTION) as u64;
    if max_jitter == 0 {
        return 0;
    }
    u64::from(nanos) % max_jitter
}
