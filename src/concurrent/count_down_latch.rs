use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::concurrent::wait_signal::WaitSignal;

#[derive(Debug)]
struct LatchState {
  count: usize,
  released: WaitSignal,
}

/// A one-shot barrier: tasks wait until the count reaches zero.
#[derive(Clone)]
pub struct CountDownLatch {
  state: Arc<Mutex<LatchState>>,
}

impl Debug for CountDownLatch {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CountDownLatch").finish()
  }
}

impl Eq for CountDownLatch {}

impl PartialEq for CountDownLatch {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.state, &other.state)
  }
}

impl Default for CountDownLatch {
  fn default() -> Self {
    Self::new(0)
  }
}

impl CountDownLatch {
  pub fn new(count: usize) -> Self {
    Self {
      state: Arc::new(Mutex::new(LatchState {
        count,
        released: WaitSignal::new(),
      })),
    }
  }

  pub async fn count_down(&self) {
    let mut state = self.state.lock().await;
    if state.count > 0 {
      state.count -= 1;
      if state.count == 0 {
        state.released.notify_all();
      }
    }
  }

  pub async fn wait(&self) {
    loop {
      let state = self.state.lock().await;
      if state.count == 0 {
        return;
      }
      let handle = state.released.wait_handle();
      drop(state);
      let _ = handle.await;
    }
  }
}
