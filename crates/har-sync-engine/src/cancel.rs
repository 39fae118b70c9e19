use std::future::Future;

use har_sync_core::SyncError;
use tokio::sync::watch;

/// Create a linked cancel handle/signal pair.
///
/// The handle side belongs to whoever can abort a sync (a Ctrl-C hook, a UI
/// button); the signal side is threaded through the coordinator, which races
/// every in-flight adapter call against it.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx: Some(rx) })
}

/// Requests cancellation of in-flight sync operations.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observed by sync operations; cancellation is permanent once requested.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires, for callers without a cancel source.
    pub fn none() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancellation is requested; pends forever otherwise,
    /// including when the handle was dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

/// Race a fallible operation against the cancellation signal. Observing the
/// signal drops the in-flight future, which aborts its wire request.
pub(crate) async fn run_cancellable<T>(
    cancel: &CancelSignal,
    op: impl Future<Output = Result<T, SyncError>>,
) -> Result<T, SyncError> {
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        result = op => result,
    }
}
