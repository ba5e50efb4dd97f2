//! Cancellation and deadlines for store calls.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};

/// Why a [`FetchContext`] stopped accepting work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// [`CancelHandle::cancel`] or [`FetchContext::cancel`] was called.
    Requested,
    /// The deadline passed.
    DeadlineElapsed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("cancellation requested"),
            Self::DeadlineElapsed => f.write_str("deadline elapsed"),
        }
    }
}

/// Cancellation flag plus optional deadline, passed unchanged into every
/// store call a traversal makes.
///
/// Clones share the same flag, so cancelling any clone (or a
/// [`CancelHandle`] taken from one) cancels them all.
#[derive(Clone, Debug, Default)]
pub struct FetchContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl FetchContext {
    /// A context that never expires on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// The same cancellation flag with an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The same cancellation flag with a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A handle that can cancel this context from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// The reason this context is done, if it is.
    pub fn done(&self) -> Option<CancelReason> {
        if self.cancelled.load(Ordering::Acquire) {
            return Some(CancelReason::Requested);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineElapsed),
            _ => None,
        }
    }

    /// Fail with [`StoreError::Cancelled`] if the context is done.
    pub fn check(&self) -> StoreResult<()> {
        match self.done() {
            Some(reason) => Err(StoreError::Cancelled(reason)),
            None => Ok(()),
        }
    }
}

/// Cancels the [`FetchContext`] it was taken from.
#[derive(Clone, Debug)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}
