use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::collections::element::Element;
use crate::collections::queue::{
  BlockingQueueReader, BlockingQueueWriter, PriorityQueue, QueueBase, QueueError, QueueSize,
};
use crate::concurrent::WaitSignal;
use crate::context::Context;

/// An element with a point in time after which it becomes eligible for
/// removal from a [`DelayQueue`].
pub trait Delayable: Element {
  fn deadline(&self) -> Instant;
}

#[derive(Debug)]
struct DelayState<E> {
  heap: PriorityQueue<E>,
  item_arrived: WaitSignal,
  space_available: WaitSignal,
}

/// A queue whose elements mature at their own deadlines.
///
/// Elements are held in a [`PriorityQueue`] ordered by ascending deadline,
/// so the head is always the next element to mature. `dequeue` blocks
/// until the head's deadline has passed; an element arriving mid-wait may
/// carry an earlier deadline, so the waiter re-evaluates the true head on
/// every wake rather than assuming it still owns the one it peeked.
#[derive(Debug, Clone)]
pub struct DelayQueue<E: Delayable> {
  inner: Arc<Mutex<DelayState<E>>>,
}

impl<E: Delayable> DelayQueue<E> {
  /// `QueueSize::Limitless` makes the queue unbounded; `Limited(n)` bounds
  /// it to `n` elements, making enqueue block while full.
  pub fn new(capacity: QueueSize) -> Self {
    let heap = PriorityQueue::new(capacity, |a: &E, b: &E| a.deadline().cmp(&b.deadline()));
    Self {
      inner: Arc::new(Mutex::new(DelayState {
        heap,
        item_arrived: WaitSignal::new(),
        space_available: WaitSignal::new(),
      })),
    }
  }

  /// Snapshot of the currently held elements in heap layout order.
  pub async fn to_vec(&self) -> Vec<E>
  where
    E: Clone,
  {
    let state = self.inner.lock().await;
    state.heap.to_vec()
  }
}

#[async_trait]
impl<E: Delayable> QueueBase<E> for DelayQueue<E> {
  async fn len(&self) -> QueueSize {
    let state = self.inner.lock().await;
    QueueSize::Limited(state.heap.len())
  }

  async fn capacity(&self) -> QueueSize {
    let state = self.inner.lock().await;
    state.heap.capacity()
  }
}

#[async_trait]
impl<E: Delayable> BlockingQueueWriter<E> for DelayQueue<E> {
  async fn enqueue(&self, ctx: &Context, element: E) -> Result<(), QueueError<E>> {
    let mut element = element;
    loop {
      if let Some(cause) = ctx.err() {
        return Err(QueueError::Canceled(cause));
      }
      let mut state = self.inner.lock().await;
      match state.heap.enqueue(element) {
        Ok(()) => {
          state.item_arrived.notify_all();
          return Ok(());
        }
        Err(QueueError::OutOfCapacity(returned)) => {
          element = returned;
          let handle = state.space_available.wait_handle();
          drop(state);
          tokio::select! {
            cause = ctx.done() => return Err(QueueError::Canceled(cause)),
            _ = handle => {}
          }
        }
        Err(other) => return Err(other),
      }
    }
  }
}

#[async_trait]
impl<E: Delayable> BlockingQueueReader<E> for DelayQueue<E> {
  async fn dequeue(&self, ctx: &Context) -> Result<E, QueueError<E>> {
    loop {
      if let Some(cause) = ctx.err() {
        return Err(QueueError::Canceled(cause));
      }
      let mut state = self.inner.lock().await;
      let deadline = state.heap.peek().ok().map(|head| head.deadline());
      let deadline = match deadline {
        Some(deadline) => deadline,
        None => {
          let handle = state.item_arrived.wait_handle();
          drop(state);
          tokio::select! {
            cause = ctx.done() => return Err(QueueError::Canceled(cause)),
            _ = handle => {}
          }
          continue;
        }
      };
      let now = Instant::now();
      if now >= deadline {
        let element = state.heap.dequeue()?;
        state.space_available.notify_all();
        return Ok(element);
      }
      // The head is not mature yet. Wait for whichever comes first: the
      // caller's context, the head's deadline, or a newly arrived element
      // that may sort earlier. The sleep is dropped, not leaked, when
      // another branch wins.
      let handle = state.item_arrived.wait_handle();
      drop(state);
      trace!(remaining = ?(deadline - now), "delay queue head not mature yet");
      tokio::select! {
        cause = ctx.done() => return Err(QueueError::Canceled(cause)),
        _ = sleep_until(deadline) => {}
        _ = handle => {}
      }
    }
  }
}
