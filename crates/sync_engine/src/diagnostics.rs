//! Out-of-band diagnostics stream

use contracts::Diagnostic;
use tokio::sync::broadcast;
use tracing::trace;

/// Fan-out diagnostics channel; publishing never blocks the poll loop
///
/// Every subscriber sees every diagnostic published after it subscribed.
/// A subscriber that falls more than `capacity` behind loses the oldest
/// entries and gets `RecvError::Lagged` instead.
#[derive(Debug, Clone)]
pub(crate) struct DiagnosticsChannel {
    tx: broadcast::Sender<Diagnostic>,
}

impl DiagnosticsChannel {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.tx.subscribe()
    }

    /// Publish a diagnostic to the current subscribers
    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        observability::record_diagnostic(&diagnostic);
        if let Err(broadcast::error::SendError(unheard)) = self.tx.send(diagnostic) {
            trace!(kind = unheard.kind(), "no diagnostics subscriber");
        }
    }
}
