use std::fmt::{Debug, Formatter};

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};

/// The cause of a context firing. Passed through queue operations unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
  /// The context was cancelled by a caller.
  #[error("context canceled")]
  Canceled,
  /// The context's deadline passed.
  #[error("context deadline exceeded")]
  DeadlineExceeded,
}

/// A cancellable deadline context consulted at every suspension point.
///
/// Cloning yields a handle to the same context. The first cause to fire
/// (manual cancellation or deadline expiry) wins and never changes
/// afterwards.
#[derive(Clone)]
pub struct Context {
  deadline: Option<Instant>,
  cause: watch::Sender<Option<ContextError>>,
}

impl Debug for Context {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Context")
      .field("deadline", &self.deadline)
      .field("cause", &*self.cause.borrow())
      .finish()
  }
}

impl Context {
  /// A context that never fires on its own. It can still be cancelled.
  pub fn background() -> Self {
    Self {
      deadline: None,
      cause: watch::channel(None).0,
    }
  }

  /// A context that fires `timeout` from now.
  pub fn with_timeout(timeout: Duration) -> Self {
    Self::with_deadline(Instant::now() + timeout)
  }

  /// A context that fires at `deadline`. A deadline in the past fires
  /// immediately.
  pub fn with_deadline(deadline: Instant) -> Self {
    Self {
      deadline: Some(deadline),
      cause: watch::channel(None).0,
    }
  }

  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Cancels the context. Idempotent; loses to a cause that already fired.
  pub fn cancel(&self) {
    self.record(ContextError::Canceled);
  }

  /// Returns the cause if the context has fired.
  pub fn err(&self) -> Option<ContextError> {
    if let Some(cause) = *self.cause.borrow() {
      return Some(cause);
    }
    if let Some(deadline) = self.deadline {
      if Instant::now() >= deadline {
        self.record(ContextError::DeadlineExceeded);
        return *self.cause.borrow();
      }
    }
    None
  }

  /// Resolves with the cause once the context fires. Resolves immediately
  /// if it already has.
  pub async fn done(&self) -> ContextError {
    let mut rx = self.cause.subscribe();
    loop {
      if let Some(cause) = self.err() {
        return cause;
      }
      match self.deadline {
        Some(deadline) => {
          tokio::select! {
            _ = sleep_until(deadline) => {}
            _ = rx.changed() => {}
          }
        }
        None => {
          if rx.changed().await.is_err() {
            return ContextError::Canceled;
          }
        }
      }
    }
  }

  fn record(&self, cause: ContextError) {
    self.cause.send_if_modified(|current| {
      if current.is_none() {
        *current = Some(cause);
        true
      } else {
        false
      }
    });
  }
}
