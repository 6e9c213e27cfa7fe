// ── Periodic refresh scheduling ──
//
// Two independent tasks, one per cycle, each driving its own interval.
// Failures are logged and the task carries on: the next tick is the retry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::poller::Poller;
use crate::reading::Cycle;

/// Handles to the running refresh tasks.
pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the daily and annual refresh tasks on the current runtime.
    ///
    /// Both cycles run once immediately, then at their interval. A tick
    /// that falls due while the previous refresh is still running is
    /// delayed rather than bunched up.
    pub fn spawn(poller: Arc<Poller>, daily_interval: Duration, annual_interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handles = vec![
            tokio::spawn(refresh_task(
                Arc::clone(&poller),
                Cycle::Daily,
                daily_interval,
                cancel.clone(),
            )),
            tokio::spawn(refresh_task(
                poller,
                Cycle::Annual,
                annual_interval,
                cancel.clone(),
            )),
        ];
        Self { cancel, handles }
    }

    /// Stop both tasks and wait for them to finish.
    ///
    /// A refresh in flight is abandoned at its next await point.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
        }
        debug!("refresh tasks stopped");
    }
}

async fn refresh_task(poller: Arc<Poller>, cycle: Cycle, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = poller.refresh(cycle) => {
                        if let Err(e) = result {
                            warn!(%cycle, error = %e, "refresh failed; keeping previous readings");
                        }
                    }
                }
            }
        }
    }
}
