//! CLI cancellation utilities.
//!
//! Responsibilities:
//! - Provide a lightweight cancellation token that can be cloned and passed
//!   through command handlers.
//! - Define a single, recognizable `Cancelled` error used to signal user-initiated
//!   cancellation (Ctrl+C/SIGINT) through `anyhow::Result`.
//!
//! Does NOT handle:
//! - Installing signal handlers (see `main`).
//!
//! Invariants:
//! - Once cancelled, token remains cancelled forever.

use std::fmt;
use std::future::Future;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;

/// Cancellation token usable across async tasks.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel token (idempotent).
    pub fn cancel(&self) {
        let was_cancelled = self.cancelled.swap(true, Ordering::SeqCst);
        if !was_cancelled {
            self.notify.notify_waiters();
        }
    }

    /// True if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Await cancellation.
    ///
    /// The `notified()` future is created before the flag is checked so a
    /// concurrent `cancel` is never missed.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Run `future` unless cancellation arrives first.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Cancelled> {
        tokio::select! {
            output = future => Ok(output),
            () = self.cancelled() => Err(Cancelled),
        }
    }
}

/// Marker error used to indicate user-driven cancellation.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Returns true if this anyhow error represents a cancellation.
pub fn is_cancelled_error(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

/// Print standard cancellation message to stderr.
pub fn print_cancelled_message() {
    eprintln!("^C\nOperation cancelled by user");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_without_cancel() {
        let token = CancellationToken::new();
        assert_eq!(token.run(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome = token.run(std::future::pending::<()>()).await;
        assert!(outcome.is_err());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancelled_error_is_recognized() {
        let err = anyhow::Error::new(Cancelled);
        assert!(is_cancelled_error(&err));
        assert!(!is_cancelled_error(&anyhow::anyhow!("other")));
    }
}
