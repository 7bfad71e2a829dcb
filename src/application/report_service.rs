use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::ports::{EventPublisher, ReportRepository};
use crate::domain::report::ReportView;

pub const REPORT_TOPIC: &str = "report";

/// Batch summary published after each scheduled run, one message per run.
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub generated: usize,
    pub reports: &'a [ReportView],
}

pub struct ReportService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: ReportRepository, P: EventPublisher> ReportService<R, P> {
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// One scheduled run: aggregate line counts into report rows, then
    /// publish the batch summary. The rows commit first; a publish failure
    /// is logged and never undoes them (at-least-once reporting).
    pub fn run(&self) -> Result<Vec<ReportView>, DomainError> {
        let generated = self.repo.generate(Utc::now())?;

        let summary = ReportSummary {
            generated: generated.len(),
            reports: &generated,
        };
        match serde_json::to_vec(&summary) {
            Ok(payload) => {
                if let Err(e) = self.publisher.publish(REPORT_TOPIC, &payload) {
                    log::error!(
                        "report summary publish failed, {} committed rows not announced: {}",
                        generated.len(),
                        e
                    );
                }
            }
            Err(e) => log::error!("failed to serialize report summary: {}", e),
        }

        Ok(generated)
    }

    pub fn by_date(&self, day: NaiveDate) -> Result<Vec<ReportView>, DomainError> {
        self.repo.find_by_date(day)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::application::testsupport::RecordingPublisher;

    #[derive(Default)]
    struct MemoryReportRepo {
        reports: Mutex<Vec<ReportView>>,
        pending_orders: Mutex<Vec<(Uuid, i32)>>,
    }

    impl ReportRepository for MemoryReportRepo {
        fn generate(&self, now: DateTime<Utc>) -> Result<Vec<ReportView>, DomainError> {
            let generated: Vec<ReportView> = self
                .pending_orders
                .lock()
                .unwrap()
                .iter()
                .map(|(order_id, count)| ReportView {
                    id: Uuid::new_v4(),
                    order_id: *order_id,
                    count_product: *count,
                    report_at: now,
                })
                .collect();
            self.reports.lock().unwrap().extend(generated.clone());
            Ok(generated)
        }

        fn find_by_date(&self, day: NaiveDate) -> Result<Vec<ReportView>, DomainError> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.report_at.date_naive() == day)
                .cloned()
                .collect())
        }
    }

    fn service_with_orders(
        orders: &[(Uuid, i32)],
    ) -> ReportService<MemoryReportRepo, RecordingPublisher> {
        let repo = MemoryReportRepo::default();
        *repo.pending_orders.lock().unwrap() = orders.to_vec();
        ReportService::new(repo, RecordingPublisher::default())
    }

    #[test]
    fn run_publishes_one_summary_for_the_whole_batch() {
        let order_a = Uuid::new_v4();
        let order_b = Uuid::new_v4();
        let svc = service_with_orders(&[(order_a, 3), (order_b, 0)]);

        let generated = svc.run().expect("run failed");
        assert_eq!(generated.len(), 2);

        let messages = svc.publisher.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, REPORT_TOPIC);

        let summary: serde_json::Value =
            serde_json::from_slice(&messages[0].1).expect("summary should be JSON");
        assert_eq!(summary["generated"], 2);
        assert_eq!(summary["reports"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn publish_failure_keeps_the_committed_rows() {
        let svc = service_with_orders(&[(Uuid::new_v4(), 1)]);
        svc.publisher.fail.store(true, Ordering::SeqCst);

        let generated = svc.run().expect("run must not fail on publish outage");
        assert_eq!(generated.len(), 1);
        assert_eq!(svc.repo.reports.lock().unwrap().len(), 1);
    }

    #[test]
    fn by_date_delegates_to_the_repository() {
        let svc = service_with_orders(&[(Uuid::new_v4(), 2)]);
        svc.run().expect("run failed");

        let today = Utc::now().date_naive();
        assert_eq!(svc.by_date(today).expect("query failed").len(), 1);
    }
}
