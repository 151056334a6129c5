use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// A scheduled delivery that has not fired yet. Dropping it cancels it.
#[derive(Debug)]
pub struct PendingCall {
    handle: JoinHandle<()>,
}

impl PendingCall {
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Coalesces bursts of values: only the last one pushed before a quiet
/// period of `delay` is delivered on the receiver.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<PendingCall>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: None,
            },
            rx,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver going away just means nobody is listening anymore.
            let _ = tx.send(value);
        });
        self.pending = Some(PendingCall { handle });
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|pending| !pending.is_finished())
    }
}
