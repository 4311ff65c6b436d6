use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::pipeline::RunStats;
use crate::scout::Scout;

/// Shortest accepted period; tokio panics on a zero one.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs a cycle at process start, then once per interval until the process
/// exits. A slow cycle delays the next tick instead of queueing a burst.
pub async fn run_forever(scout: &Scout, every: Duration) {
    let every = every.max(MIN_INTERVAL);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;
    loop {
        // First tick completes immediately.
        ticker.tick().await;
        cycle += 1;
        info!(cycle, "Scheduled analysis cycle starting");
        let stats = scout.run_cycle().await;
        log_next(&stats, every);
    }
}

fn log_next(stats: &RunStats, every: Duration) {
    info!(
        comparisons = stats.comparisons_created,
        articles = stats.articles_persisted,
        next_in_mins = every.as_secs() / 60,
        "Cycle finished, waiting for next tick"
    );
}
