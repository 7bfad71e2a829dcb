use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ReportRepository;
use crate::domain::report::ReportView;
use crate::schema::{order_products, orders, reports};

use super::models::{NewReportRow, ReportRow};

impl From<ReportRow> for ReportView {
    fn from(row: ReportRow) -> Self {
        ReportView {
            id: row.id,
            order_id: row.order_id,
            count_product: row.count_product,
            report_at: row.report_at,
        }
    }
}

pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ReportRepository for DieselReportRepository {
    fn generate(&self, now: DateTime<Utc>) -> Result<Vec<ReportView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_ids: Vec<Uuid> = orders::table.select(orders::id).load(conn)?;
            let lines: Vec<(Uuid, i32)> = order_products::table
                .select((order_products::order_id, order_products::quantity))
                .load(conn)?;

            let mut totals: HashMap<Uuid, i32> = HashMap::new();
            for (order_id, quantity) in lines {
                *totals.entry(order_id).or_insert(0) += quantity;
            }

            // One row per order, zero for orders without lines.
            let new_rows: Vec<NewReportRow> = order_ids
                .iter()
                .map(|order_id| NewReportRow {
                    id: Uuid::new_v4(),
                    order_id: *order_id,
                    count_product: totals.get(order_id).copied().unwrap_or(0),
                    report_at: now,
                })
                .collect();

            diesel::insert_into(reports::table)
                .values(&new_rows)
                .execute(conn)?;

            Ok(new_rows
                .into_iter()
                .map(|r| ReportView {
                    id: r.id,
                    order_id: r.order_id,
                    count_product: r.count_product,
                    report_at: r.report_at,
                })
                .collect())
        })
    }

    fn find_by_date(&self, day: NaiveDate) -> Result<Vec<ReportView>, DomainError> {
        let mut conn = self.pool.get()?;

        // Exact-calendar-day match as a half-open range on the timestamp.
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = start
            .checked_add_days(Days::new(1))
            .ok_or_else(|| DomainError::InvalidInput(format!("date {} out of range", day)))?;

        let rows = reports::table
            .filter(reports::report_at.ge(start))
            .filter(reports::report_at.lt(end))
            .select(ReportRow::as_select())
            .order(reports::report_at.desc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
