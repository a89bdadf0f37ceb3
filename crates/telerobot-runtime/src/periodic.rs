//! Self-rescheduling periodic task runner.
//!
//! Runs a user-supplied task concurrently with the event loop; each run
//! reports the delay in seconds before its next run.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// A failed run must not kill the schedule; it is retried after this delay.
const FAILURE_RESCHEDULE_SECONDS: u64 = 60;

#[derive(Debug)]
pub struct PeriodicTaskHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PeriodicTaskHandle {
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub async fn shutdown(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Spawns `task` on the current runtime. The task runs immediately, then
/// again after whatever delay each run returns, until the handle is shut
/// down or the process exits.
pub fn spawn_periodic_task<F, Fut>(mut task: F) -> Result<PeriodicTaskHandle>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<u64>> + Send,
{
    let handle = tokio::runtime::Handle::try_current()
        .context("periodic task runner requires an active Tokio runtime")?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let task = handle.spawn(async move {
        loop {
            let delay_seconds = match task().await {
                Ok(delay_seconds) => delay_seconds,
                Err(error) => {
                    tracing::warn!("periodic task run failed: {error:#}");
                    FAILURE_RESCHEDULE_SECONDS
                }
            };
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = tokio::time::sleep(Duration::from_secs(delay_seconds)) => {}
            }
        }
    });

    Ok(PeriodicTaskHandle {
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::spawn_periodic_task;

    async fn wait_for_runs(runs: &AtomicUsize, at_least: usize, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if runs.load(Ordering::SeqCst) >= at_least {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("periodic task did not reach {at_least} runs before timeout");
    }

    #[tokio::test]
    async fn functional_task_reschedules_itself() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut handle = spawn_periodic_task(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(0)
            }
        })
        .expect("spawn");

        wait_for_runs(&runs, 3, Duration::from_secs(2)).await;
        assert!(handle.is_running());
        handle.shutdown().await;
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn functional_shutdown_stops_future_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut handle = spawn_periodic_task(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(3_600)
            }
        })
        .expect("spawn");

        wait_for_runs(&runs, 1, Duration::from_secs(2)).await;
        handle.shutdown().await;
        let after_shutdown = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_shutdown);
    }

    #[tokio::test]
    async fn regression_failed_run_keeps_the_schedule_alive() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut handle = spawn_periodic_task(move || {
            let counter = counter.clone();
            async move {
                let run = counter.fetch_add(1, Ordering::SeqCst);
                if run == 0 {
                    anyhow::bail!("first run fails");
                }
                Ok(0)
            }
        })
        .expect("spawn");

        // The failing first run reschedules with the failure delay, so only
        // the shutdown path is exercised here; the task must still be alive.
        wait_for_runs(&runs, 1, Duration::from_secs(2)).await;
        assert!(handle.is_running());
        handle.shutdown().await;
    }
}
