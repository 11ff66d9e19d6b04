use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaResult;
use rdkafka::message::Message;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::ClientContext;
use serde_json::Value;

use crate::domain::ports::EventPublisher;

/// Logs the delivery report of every message; nothing is re-sent.
pub struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        match result {
            Ok(message) => log::debug!(
                "Published event to {} [{}] at offset {}",
                message.topic(),
                message.partition(),
                message.offset()
            ),
            Err((e, message)) => {
                log::error!("Failed to publish event to {}: {}", message.topic(), e)
            }
        }
    }
}

/// Lifecycle events over Kafka.
///
/// `publish` only enqueues into librdkafka's buffer; a background thread
/// drives delivery and the outcome is reported to [`DeliveryLogger`].
pub struct KafkaEventPublisher {
    producer: ThreadedProducer<DeliveryLogger>,
}

impl KafkaEventPublisher {
    pub fn new(brokers: &str, message_timeout: Duration) -> KafkaResult<Self> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", message_timeout.as_millis().to_string())
            .set("message.send.max.retries", "0")
            .create_with_context(DeliveryLogger)?;
        log::info!("Kafka producer initialized for {}", brokers);
        Ok(Self { producer })
    }

    /// Wait for in-flight messages, e.g. on shutdown.
    pub fn flush(&self, timeout: Duration) {
        if let Err(e) = self.producer.flush(timeout) {
            log::warn!("Kafka flush did not complete: {}", e);
        }
    }
}

impl EventPublisher for KafkaEventPublisher {
    fn publish(&self, topic: &str, key: &str, payload: &Value) {
        let body = payload.to_string();
        let record = BaseRecord::to(topic).key(key).payload(&body);
        match self.producer.send(record) {
            Ok(()) => log::info!("Queued event to {} for order {}", topic, key),
            Err((e, _)) => log::error!("Failed to queue event to {} for order {}: {}", topic, key, e),
        }
    }
}
