//! Cooperative stop signal shared by every session of a run.
//!
//! One [`StopHandle`] writes, any number of [`StopSignal`]s observe. Stopping
//! is idempotent and sticky: once set it is never cleared.

use std::sync::Arc;
use tokio::sync::watch;

/// Create a linked handle/signal pair in the running state
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx: Arc::new(tx) }, StopSignal { rx })
}

/// Writer side, owned by the orchestrator
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Request every session to stop at its next suspension point
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// A fresh observer for a late-spawned session
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Reader side, one clone per session
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once stop has been requested. Never resolves if the handle is
    /// dropped without stopping; sessions then run to their own deadline.
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_stop_wakes_every_signal() {
        let (handle, signal) = stop_channel();
        let mut a = signal.clone();
        let mut b = handle.signal();
        assert!(!a.is_stopped());

        let waiter = tokio::spawn(async move {
            a.stopped().await;
            true
        });

        handle.stop();
        assert!(waiter.await.unwrap());
        timeout(Duration::from_secs(1), b.stopped()).await.unwrap();
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (handle, mut signal) = stop_channel();
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
        // already-set state resolves immediately
        timeout(Duration::from_millis(100), signal.stopped()).await.unwrap();
    }

    #[test]
    fn test_stopped_wakes_pending_waiter() {
        let (handle, mut signal) = stop_channel();
        let mut stopped = tokio_test::task::spawn(signal.stopped());

        tokio_test::assert_pending!(stopped.poll());
        handle.stop();
        assert!(stopped.is_woken());
        tokio_test::assert_ready!(stopped.poll());
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_stop() {
        let (handle, mut signal) = stop_channel();
        drop(handle);
        assert!(!signal.is_stopped());
        assert!(timeout(Duration::from_millis(50), signal.stopped()).await.is_err());
    }
}
