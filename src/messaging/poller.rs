//! Periodic conversation refresh
//!
//! A background task that fires a refresh at a fixed interval while the
//! messaging view is mounted. The task is owned by a [`Poller`] handle and
//! is aborted when the handle is stopped or dropped.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Handle to a running poll loop
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling
    ///
    /// `tick` runs once per `interval`, starting one interval from now.
    /// Ticks are sequential: a slow tick delays the next one instead of
    /// overlapping it. The loop ends by itself when `tick` returns `false`.
    ///
    /// Must be called within a tokio runtime.
    pub fn start<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        info!("Starting conversation poller (every {:?})", interval);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                debug!("Poller tick");
                if !tick().await {
                    debug!("Poller target gone, stopping");
                    break;
                }
            }
        });

        Self {
            interval,
            task: Some(task),
        }
    }

    /// Polling interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the loop is still scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling
    ///
    /// The task is cancelled immediately; no tick starts after this returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Conversation poller stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
