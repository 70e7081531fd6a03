use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::scheduling::SchedulingService;

/// Periodically completes upcoming appointments whose session has ended.
/// Only started when an interval is configured.
pub fn spawn_completion_sweep(service: SchedulingService, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting appointment completion sweep");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = service.complete_elapsed().await {
                error!("Completion sweep failed: {}", e);
            }
        }
    })
}
