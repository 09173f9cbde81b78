//! Shared cancellation signal that remembers why it fired.

use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// A cancellation token paired with the error that triggered it.
///
/// Clones share state. The first call to [`CancelCause::cancel_with`] or
/// [`CancelCause::cancel`] wins: later calls neither replace the recorded
/// cause nor add one after a plain cancellation.
pub struct CancelCause<E> {
    token: CancellationToken,
    cause: Arc<Mutex<Option<E>>>,
}

impl<E> CancelCause<E> {
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// Wraps an existing token so outside holders can observe the pipeline.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            cause: Arc::new(Mutex::new(None)),
        }
    }

    /// Token for tasks that only need to observe cancellation.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancels with `err` as cause. Returns `false` if already cancelled,
    /// in which case `err` is dropped.
    pub fn cancel_with(&self, err: E) -> bool {
        let mut cause = self.cause.lock().unwrap_or_else(PoisonError::into_inner);
        if self.token.is_cancelled() {
            return false;
        }
        *cause = Some(err);
        self.token.cancel();
        true
    }

    /// Cancels without recording a cause, e.g. on an external shutdown request.
    pub fn cancel(&self) {
        let _cause = self.cause.lock().unwrap_or_else(PoisonError::into_inner);
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Removes and returns the recorded cause, if any.
    pub fn take_cause(&self) -> Option<E> {
        self.cause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn has_cause(&self) -> bool {
        self.cause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<E> Clone for CancelCause<E> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            cause: Arc::clone(&self.cause),
        }
    }
}

impl<E> Default for CancelCause<E> {
    fn default() -> Self {
        Self::new()
    }
}
