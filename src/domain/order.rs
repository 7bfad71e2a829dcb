use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";

/// One (product, quantity) line of an order being created. Duplicate product
/// ids in the request are folded into a single line before this type is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineView {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

/// Fold a raw product-id list into aggregated order lines, preserving
/// first-appearance order. A product id referenced twice becomes one line
/// with quantity 2.
pub fn aggregate_lines(product_ids: &[Uuid]) -> Vec<OrderLineInput> {
    let mut lines: Vec<OrderLineInput> = Vec::new();
    for id in product_ids {
        match lines.iter_mut().find(|l| l.product_id == *id) {
            Some(line) => line.quantity += 1,
            None => lines.push(OrderLineInput {
                product_id: *id,
                quantity: 1,
            }),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_ids_become_one_line_each() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let lines = aggregate_lines(&[a, b]);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.quantity == 1));
    }

    #[test]
    fn duplicate_ids_aggregate_quantity() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let lines = aggregate_lines(&[a, b, a, a]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], OrderLineInput { product_id: a, quantity: 3 });
        assert_eq!(lines[1], OrderLineInput { product_id: b, quantity: 1 });
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(aggregate_lines(&[]).is_empty());
    }
}
