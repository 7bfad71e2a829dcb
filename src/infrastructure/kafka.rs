use std::time::Duration;

use rdkafka::producer::{BaseProducer, BaseRecord, Producer};
use rdkafka::ClientConfig;

use crate::domain::errors::DomainError;
use crate::domain::ports::EventPublisher;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct KafkaEventPublisher {
    producer: BaseProducer,
}

impl KafkaEventPublisher {
    pub fn new(brokers: &str) -> Result<Self, DomainError> {
        let producer: BaseProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| DomainError::Unavailable {
                service: "queue",
                reason: e.to_string(),
            })?;
        Ok(Self { producer })
    }
}

impl EventPublisher for KafkaEventPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DomainError> {
        self.producer
            .send(BaseRecord::<(), [u8]>::to(topic).payload(payload))
            .map_err(|(e, _)| DomainError::Unavailable {
                service: "queue",
                reason: e.to_string(),
            })?;
        // Block until delivery so the caller can log a publish failure
        // instead of silently dropping the batch.
        self.producer
            .flush(FLUSH_TIMEOUT)
            .map_err(|e| DomainError::Unavailable {
                service: "queue",
                reason: e.to_string(),
            })
    }
}
