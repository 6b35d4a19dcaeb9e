use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::error::GribError;

/// Caller-supplied deadline and cancellation signal for blocking reads.
///
/// Every operation that may touch the underlying byte source calls
/// [`check`](ReadContext::check) before reading, so a cancelled or expired
/// context stops a lookup before any I/O is issued.
///
/// # Examples
///
/// ```
/// use gribpoint::{GribError, ReadContext};
///
/// let (ctx, handle) = ReadContext::cancellable();
/// assert!(ctx.check().is_ok());
///
/// handle.cancel();
/// assert!(matches!(ctx.check(), Err(GribError::Cancelled)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadContext {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl ReadContext {
    /// Returns a context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a context together with the handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = Self {
            deadline: None,
            cancelled: Some(Arc::clone(&flag)),
        };
        (ctx, CancelHandle(flag))
    }

    pub fn with_deadline(self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails if the context has been cancelled or its deadline has passed.
    ///
    /// Cancellation takes precedence over the deadline.
    pub fn check(&self) -> Result<(), GribError> {
        if let Some(flag) = &self.cancelled {
            if flag.load(Ordering::Acquire) {
                return Err(GribError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(GribError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

/// Cancels every [`ReadContext`] cloned from the one it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
