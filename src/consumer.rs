use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::errors::DomainError;
use crate::domain::product::ProductChanges;
use crate::AppState;

pub const ORDER_TOPIC: &str = "order";
pub const PRODUCT_TOPIC: &str = "product";

/// Payload of the "order" topic: an order to place on behalf of a user.
#[derive(Debug, Deserialize)]
pub struct OrderMessage {
    pub user_id: Uuid,
    pub product_ids: Vec<Uuid>,
}

/// Payload of the "product" topic: a stock correction for one product.
#[derive(Debug, Deserialize)]
pub struct ProductMessage {
    pub product_id: Uuid,
    pub stock_quantity: i32,
}

fn build_consumer(config: &Config) -> Result<StreamConsumer, DomainError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &config.kafka_brokers)
        .set("group.id", &config.kafka_group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "true")
        .create()
        .map_err(|e| DomainError::Unavailable {
            service: "queue",
            reason: e.to_string(),
        })?;

    consumer
        .subscribe(&[ORDER_TOPIC, PRODUCT_TOPIC])
        .map_err(|e| DomainError::Unavailable {
            service: "queue",
            reason: e.to_string(),
        })?;

    Ok(consumer)
}

/// Consumes the "order" and "product" topics forever, dispatching each
/// message to the matching service. A malformed or failing message is
/// logged and skipped so one bad payload cannot wedge the partition.
pub async fn run(state: AppState, config: Config) -> Result<(), DomainError> {
    let consumer = build_consumer(&config)?;
    log::info!(
        "queue consumer started on {} for topics [{}, {}]",
        config.kafka_brokers,
        ORDER_TOPIC,
        PRODUCT_TOPIC
    );

    loop {
        match consumer.recv().await {
            Ok(message) => {
                let topic = message.topic().to_string();
                let payload = message.payload().unwrap_or_default().to_vec();
                if let Err(e) = dispatch(&state, &topic, &payload).await {
                    log::warn!("message on '{}' skipped: {}", topic, e);
                }
            }
            Err(e) => log::error!("queue receive error: {}", e),
        }
    }
}

async fn dispatch(state: &AppState, topic: &str, payload: &[u8]) -> Result<(), DomainError> {
    match topic {
        ORDER_TOPIC => {
            let msg = decode_order(payload)?;
            let orders = state.orders.clone();
            let order = tokio::task::spawn_blocking(move || {
                orders.create(msg.user_id, &msg.product_ids)
            })
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))??;
            log::info!("order {} created from queue message", order.id);
        }
        PRODUCT_TOPIC => {
            let msg = decode_product(payload)?;
            let products = state.products.clone();
            let updated = tokio::task::spawn_blocking(move || {
                products.update(
                    msg.product_id,
                    ProductChanges {
                        stock_quantity: Some(msg.stock_quantity),
                        ..Default::default()
                    },
                )
            })
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))??;
            match updated {
                Some(product) => log::info!(
                    "product {} stock set to {} from queue message",
                    product.id,
                    product.stock_quantity
                ),
                None => {
                    return Err(DomainError::not_found("product", msg.product_id));
                }
            }
        }
        other => log::warn!("ignoring message on unexpected topic '{}'", other),
    }
    Ok(())
}

fn decode_order(payload: &[u8]) -> Result<OrderMessage, DomainError> {
    serde_json::from_slice(payload)
        .map_err(|e| DomainError::InvalidInput(format!("bad order payload: {}", e)))
}

fn decode_product(payload: &[u8]) -> Result<ProductMessage, DomainError> {
    serde_json::from_slice(payload)
        .map_err(|e| DomainError::InvalidInput(format!("bad product payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_payload_decodes() {
        let user_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let payload = serde_json::json!({
            "user_id": user_id,
            "product_ids": [product_id, product_id],
        });

        let msg = decode_order(payload.to_string().as_bytes()).expect("decode failed");
        assert_eq!(msg.user_id, user_id);
        assert_eq!(msg.product_ids, vec![product_id, product_id]);
    }

    #[test]
    fn product_payload_decodes() {
        let product_id = Uuid::new_v4();
        let payload = serde_json::json!({
            "product_id": product_id,
            "stock_quantity": 7,
        });

        let msg = decode_product(payload.to_string().as_bytes()).expect("decode failed");
        assert_eq!(msg.product_id, product_id);
        assert_eq!(msg.stock_quantity, 7);
    }

    #[test]
    fn malformed_payloads_are_invalid_input() {
        let err = decode_order(b"not json").expect_err("garbage should fail");
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = decode_product(b"{\"product_id\": 12}").expect_err("bad uuid should fail");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
