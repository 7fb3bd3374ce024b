//! Periodic background tasks with an explicit stop handle.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a task spawned by [`spawn_periodic`].
///
/// Dropping the handle without calling [`stop`](Self::stop) leaves the task
/// running until the runtime shuts down.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the task and wait for the in-flight tick to complete.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.join.await {
            tracing::error!(task = self.name, %err, "background task ended abnormally");
        }
    }

    /// Cancel the task at its next suspension point.
    pub fn abort(self) {
        self.join.abort();
    }
}

/// Run `tick` every `period` on a dedicated task.
///
/// Ticks never overlap: the next one waits for the previous to finish and
/// ticks missed meanwhile are skipped. The first tick fires immediately.
pub fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop, mut stopped) = watch::channel(false);
    let join = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                _ = interval.tick() => tick().await,
            }
        }
        tracing::debug!(task = name, "background task stopped");
    });
    tracing::info!(task = name, ?period, "background task started");
    TaskHandle { name, stop, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn should_tick_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let handle = spawn_periodic("counter", Duration::from_millis(5), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.stop().await;
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn should_report_task_name() {
        let handle = spawn_periodic("named", Duration::from_secs(60), || async {});
        assert_eq!(handle.name(), "named");
        assert!(!handle.is_finished());
        handle.abort();
    }
}
