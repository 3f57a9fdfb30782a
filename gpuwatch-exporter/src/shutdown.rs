use std::future::{pending, Future};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{error, warn};

/// How long the loop gets to wind down after a stop request
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Watches for a stop request on its own task.
///
/// The loop learns about the request through [`Watchdog::stopped`]. A device
/// read or sink write can block the thread the loop runs on, so if the loop
/// has not called [`Watchdog::finish`] within the grace period the watchdog
/// runs `force` itself.
pub struct Watchdog {
    stopped: Option<oneshot::Receiver<&'static str>>,
    reason: Option<&'static str>,
    finished: oneshot::Sender<()>,
}

impl Watchdog {
    /// Spawn the watching task. Must be called from inside a tokio runtime,
    /// and needs a multi-threaded one for `force` to fire while the loop's
    /// thread is blocked.
    pub fn spawn<F, K>(signal: F, grace: Duration, force: K) -> Self
    where
        F: Future<Output = &'static str> + Send + 'static,
        K: FnOnce() + Send + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel();
        let (done_tx, mut done_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let name = tokio::select! {
                name = signal => name,
                _ = &mut done_rx => return,
            };

            warn!("Received {}, stopping", name);
            let _ = stop_tx.send(name);

            // A dropped watchdog counts as finished
            if timeout(grace, done_rx).await.is_err() {
                error!("Sampling did not stop within {:?}, exiting", grace);
                force();
            }
        });

        Self {
            stopped: Some(stop_rx),
            reason: None,
            finished: done_tx,
        }
    }

    /// Resolves with the signal name once a stop was requested. Never
    /// resolves if none arrives.
    pub async fn stopped(&mut self) -> &'static str {
        if let Some(name) = self.reason {
            return name;
        }

        if let Some(receiver) = self.stopped.as_mut() {
            match receiver.await {
                Ok(name) => {
                    self.reason = Some(name);
                    self.stopped = None;
                    return name;
                }
                Err(_) => self.stopped = None,
            }
        }

        pending().await
    }

    /// Whether a stop request has been observed
    pub fn is_stopped(&self) -> bool {
        self.reason.is_some()
    }

    /// Tell the watching task the loop has wound down
    pub fn finish(self) {
        let _ = self.finished.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn flag() -> (Arc<AtomicBool>, impl FnOnce() + Send + 'static) {
        let forced = Arc::new(AtomicBool::new(false));
        let setter = forced.clone();
        (forced, move || setter.store(true, Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_request_reaches_loop() {
        let (forced, force) = flag();
        let mut watchdog = Watchdog::spawn(
            async {
                sleep(Duration::from_secs(1)).await;
                "SIGTERM"
            },
            SHUTDOWN_GRACE,
            force,
        );

        assert_eq!(watchdog.stopped().await, "SIGTERM");
        assert!(watchdog.is_stopped());
        // Asking again does not wait for another signal
        assert_eq!(watchdog.stopped().await, "SIGTERM");

        watchdog.finish();
        sleep(SHUTDOWN_GRACE * 2).await;
        assert!(!forced.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unfinished_loop_is_forced() {
        let (forced, force) = flag();
        let mut watchdog = Watchdog::spawn(async { "SIGINT" }, SHUTDOWN_GRACE, force);

        assert_eq!(watchdog.stopped().await, "SIGINT");
        sleep(SHUTDOWN_GRACE + Duration::from_millis(100)).await;
        assert!(forced.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_without_signal() {
        let (forced, force) = flag();
        let watchdog = Watchdog::spawn(pending(), SHUTDOWN_GRACE, force);

        assert!(!watchdog.is_stopped());
        watchdog.finish();
        sleep(SHUTDOWN_GRACE * 2).await;
        assert!(!forced.load(Ordering::SeqCst));
    }
}
