use tokio::sync::oneshot;

use crate::errors::ResolveError;
use crate::models::decision::ProcessorOutcome;

/// One-shot resolver bound to a caller whose HTTP request is still open.
///
/// Owned by exactly one [`super::PendingEntry`]. The first successful or
/// failed `resolve` consumes the underlying sender; any later call returns
/// [`ResolveError::AlreadyResolved`].
#[derive(Debug)]
pub struct CompletionHandle {
    tx: Option<oneshot::Sender<ProcessorOutcome>>,
}

/// The caller's side of a [`CompletionHandle`].
pub type OutcomeReceiver = oneshot::Receiver<ProcessorOutcome>;

impl CompletionHandle {
    pub fn new() -> (Self, OutcomeReceiver) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn resolve(&mut self, outcome: ProcessorOutcome) -> Result<(), ResolveError> {
        let tx = self.tx.take().ok_or(ResolveError::AlreadyResolved)?;
        tx.send(outcome).map_err(|_| ResolveError::CallerGone)
    }

    #[cfg(test)]
    pub fn is_resolved(&self) -> bool {
        self.tx.is_none()
    }

    /// True when the caller stopped waiting (request future dropped).
    pub fn is_caller_gone(&self) -> bool {
        self.tx.as_ref().map_or(false, |tx| tx.is_closed())
    }
}
