use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Write-once aggregation row: total line quantity of one order at the time
/// the report job ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub count_product: i32,
    pub report_at: DateTime<Utc>,
}
