//! Cancellation context threaded through every handler call.
//!
//! Resolution is synchronous, so the pipeline itself never polls the
//! context. Handlers that do slow work (decryption, I/O) call
//! [`Context::check`] before starting it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::Error;

/// A cancellation flag with an optional deadline.
///
/// Clones share the flag: cancelling any clone cancels them all.
///
/// ```rust
/// use structconf::Context;
///
/// let ctx = Context::background();
/// let child = ctx.clone();
/// assert!(ctx.check().is_ok());
///
/// child.cancel();
/// assert!(ctx.is_cancelled());
/// assert!(ctx.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context that expires `timeout` from now.
    ///
    /// The child shares this context's cancellation flag. An existing
    /// earlier deadline is kept. A timeout too large to represent as an
    /// instant adds no deadline.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Derives a context that expires at `deadline`.
    ///
    /// The child shares this context's cancellation flag. An existing
    /// earlier deadline is kept.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };

        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Marks the context cancelled.
    ///
    /// Returns `true` if this call performed the cancellation.
    pub fn cancel(&self) -> bool {
        self.cancelled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The deadline, if one was set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails if the context is cancelled or past its deadline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::DeadlineExceeded`].
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn test_cancel_is_shared_and_idempotent() {
        let ctx = Context::background();
        let child = ctx.with_timeout(Duration::from_secs(60));
        assert!(child.cancel());
        assert!(!ctx.cancel());
        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = Context::background().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(Error::DeadlineExceeded)));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let soon = Instant::now() + Duration::from_secs(1);
        let ctx = Context::background().with_deadline(soon);
        let child = ctx.with_timeout(Duration::from_secs(3600));
        assert_eq!(child.deadline(), Some(soon));
    }

    #[test]
    fn test_unrepresentable_timeout_adds_no_deadline() {
        let ctx = Context::background();
        let child = ctx.with_timeout(Duration::MAX);
        assert!(child.deadline().is_none());
        assert!(child.check().is_ok());

        child.cancel();
        assert!(ctx.is_cancelled());

        let soon = Instant::now() + Duration::from_secs(1);
        let bounded = Context::background().with_deadline(soon);
        assert_eq!(bounded.with_timeout(Duration::MAX).deadline(), Some(soon));
    }
}
