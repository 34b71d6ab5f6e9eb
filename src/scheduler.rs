// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::engine::AlertEngine;

#[derive(Clone, Copy, Debug)]
pub struct PollSchedulerCfg {
    /// Seconds between checks after a clean iteration.
    pub interval_secs: u64,
    /// Shorter pause after an iteration blew up, before resuming.
    pub recovery_secs: u64,
}

impl Default for PollSchedulerCfg {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            recovery_secs: 60,
        }
    }
}

/// Spawn the background poll loop: run a check, sleep, repeat until the
/// shutdown signal flips. The loop itself never exits on a bad iteration —
/// `check_once` absorbs feed and delivery failures, and a panicking check
/// task only costs the recovery pause.
pub fn spawn_poll_scheduler(
    engine: Arc<AlertEngine>,
    cfg: PollSchedulerCfg,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tracing::info!("running scheduled alert check");

            let run = tokio::spawn({
                let engine = engine.clone();
                async move { engine.check_once().await }
            });

            let pause = match run.await {
                Ok(new_alerts) => {
                    tracing::info!(
                        new_alerts,
                        wait_secs = cfg.interval_secs,
                        "scheduled check completed"
                    );
                    Duration::from_secs(cfg.interval_secs)
                }
                Err(e) => {
                    tracing::error!(error = ?e, "scheduled check crashed; backing off");
                    Duration::from_secs(cfg.recovery_secs)
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown.changed() => {
                    tracing::info!("poll scheduler stopping");
                    break;
                }
            }
        }
    })
}
