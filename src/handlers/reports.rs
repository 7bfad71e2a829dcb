use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::report::ReportView;
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportQuery {
    /// Calendar day to query, formatted YYYY-MM-DD.
    pub date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub count_product: i32,
    pub report_at: String,
}

impl From<ReportView> for ReportResponse {
    fn from(report: ReportView) -> Self {
        ReportResponse {
            id: report.id,
            order_id: report.order_id,
            count_product: report.count_product,
            report_at: report.report_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListReportsResponse {
    pub date: String,
    pub items: Vec<ReportResponse>,
    pub total: usize,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /reports?date=YYYY-MM-DD
#[utoipa::path(
    get,
    path = "/reports",
    params(("date" = String, Query, description = "Calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Reports generated on that day", body = ListReportsResponse),
        (status = 400, description = "Malformed date"),
    ),
    tag = "reports"
)]
pub async fn list_reports(
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let day = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|e| AppError::BadRequest(format!("Invalid date '{}': {}", query.date, e)))?;
    let reports = state.reports.clone();

    let items = web::block(move || reports.by_date(day))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListReportsResponse {
        date: query.date,
        total: items.len(),
        items: items.into_iter().map(Into::into).collect(),
    }))
}
