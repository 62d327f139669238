//! Cancellable background timers with live-handle accounting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Counts live timer handles and remembers the highest count ever seen.
#[derive(Debug, Default)]
pub struct TimerGauge {
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl TimerGauge {
    /// Handles currently armed.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously armed handles.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn acquire(&self) {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn release(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A spawned periodic task that stops when cancelled or dropped.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    gauge: Arc<TimerGauge>,
}

impl TimerHandle {
    /// Spawn `make(cancel)` on the current runtime.
    ///
    /// The task receives the cancellation token so it can leave its loop
    /// between ticks.
    pub fn spawn<F, Fut>(gauge: Arc<TimerGauge>, make: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        gauge.acquire();
        let task = tokio::spawn(make(cancel.clone()));
        Self { cancel, task, gauge }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
        self.gauge.release();
    }
}
