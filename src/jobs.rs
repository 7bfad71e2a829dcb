use std::time::Duration;

use crate::AppState;

/// Fixed-interval report job. Each tick aggregates current orders into
/// report rows and publishes the batch summary; a failed tick is logged
/// and the schedule keeps going.
pub async fn run_report_job(state: AppState, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    log::info!("report job scheduled every {}s", interval_secs);

    loop {
        ticker.tick().await;
        let reports = state.reports.clone();
        let outcome = tokio::task::spawn_blocking(move || reports.run()).await;
        match outcome {
            Ok(Ok(generated)) => {
                log::info!("report run generated {} rows", generated.len())
            }
            Ok(Err(e)) => log::error!("report run failed: {}", e),
            Err(e) => log::error!("report task panicked: {}", e),
        }
    }
}
