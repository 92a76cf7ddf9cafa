use std::fmt::{Debug, Formatter};
use std::mem;

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

/// A handle onto one notification cycle of a [`WaitSignal`].
///
/// Resolves exactly once, when the cycle it was obtained from is closed by
/// `notify_all`. Every clone taken from the same cycle resolves
/// simultaneously. The yielded value carries no information; either way it
/// resolves means "go re-check your condition".
pub type WaitHandle = Shared<oneshot::Receiver<()>>;

/// A lock-scoped broadcast wake primitive.
///
/// A `WaitSignal` lives inside the state guarded by a queue's lock and
/// holds the current cycle's one-shot signal. A signal, once closed, is
/// never reused; `notify_all` installs a fresh one for subsequent waiters.
///
/// The protocol that makes lost wakeups impossible:
/// - [`wait_handle`](WaitSignal::wait_handle) must be called while the
///   guarding lock is held. The caller then releases the lock and awaits
///   the handle. Because the handle was obtained before the lock was given
///   up, the waiter either observes the state change on its next re-check
///   or is woken by the very next `notify_all`.
/// - [`notify_all`](WaitSignal::notify_all) must be called while the lock
///   is held. A waiter about to sleep must never hold the lock.
pub struct WaitSignal {
  tx: oneshot::Sender<()>,
  rx: Shared<oneshot::Receiver<()>>,
}

impl WaitSignal {
  pub fn new() -> Self {
    let (tx, rx) = oneshot::channel();
    Self { tx, rx: rx.shared() }
  }

  /// Subscribes to the current cycle. Must be called while the guarding
  /// lock is held; the caller releases the lock before awaiting the
  /// returned handle.
  pub fn wait_handle(&self) -> WaitHandle {
    self.rx.clone()
  }

  /// Closes the current cycle, releasing every handle obtained from it,
  /// and installs a fresh signal. Must be called while the guarding lock
  /// is held. Does nothing observable when nobody subscribed.
  pub fn notify_all(&mut self) {
    let (tx, rx) = oneshot::channel();
    let old = mem::replace(&mut self.tx, tx);
    self.rx = rx.shared();
    let _ = old.send(());
  }
}

impl Default for WaitSignal {
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for WaitSignal {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WaitSignal").finish()
  }
}
