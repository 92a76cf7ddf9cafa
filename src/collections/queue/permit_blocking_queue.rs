use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, Semaphore};
use tracing::debug;

use crate::collections::element::Element;
use crate::collections::queue::{BlockingQueueReader, BlockingQueueWriter, QueueBase, QueueError, QueueSize};
use crate::context::Context;

#[derive(Debug)]
struct PermitState<E> {
  buffer: Vec<Option<E>>,
  head: usize,
  tail: usize,
  count: usize,
}

#[derive(Debug)]
struct Inner<E> {
  state: RwLock<PermitState<E>>,
  enqueue_permits: Semaphore,
  dequeue_permits: Semaphore,
}

/// A fixed-capacity blocking queue governed by counting permits.
///
/// A deliberate alternative to [`RingBlockingQueue`]: instead of
/// broadcast wakeups, each side acquires one permit from its own pool
/// before touching the buffer, and on success transfers the unit to the
/// opposite pool. Exactly one waiter is woken per handoff. Externally the
/// two designs behave the same: FIFO order, deadline-aware blocking, no
/// overcommit.
///
/// The dequeue pool starts at zero — the queue starts empty, so there is
/// nothing to dequeue until a producer hands a unit over.
///
/// [`RingBlockingQueue`]: crate::collections::RingBlockingQueue
#[derive(Debug, Clone)]
pub struct PermitBlockingQueue<E> {
  inner: Arc<Inner<E>>,
}

impl<E: Element> PermitBlockingQueue<E> {
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "Capacity must be greater than zero");
    let mut buffer = Vec::with_capacity(capacity);
    buffer.resize_with(capacity, || None);
    Self {
      inner: Arc::new(Inner {
        state: RwLock::new(PermitState {
          buffer,
          head: 0,
          tail: 0,
          count: 0,
        }),
        enqueue_permits: Semaphore::new(capacity),
        dequeue_permits: Semaphore::new(0),
      }),
    }
  }

  /// Snapshot of the current elements in enqueue order.
  pub async fn to_vec(&self) -> Vec<E>
  where
    E: Clone,
  {
    let state = self.inner.state.read().await;
    let capacity = state.buffer.len();
    let mut out = Vec::with_capacity(state.count);
    for offset in 0..state.count {
      let index = (state.head + offset) % capacity;
      if let Some(element) = &state.buffer[index] {
        out.push(element.clone());
      }
    }
    out
  }
}

#[async_trait]
impl<E: Element> QueueBase<E> for PermitBlockingQueue<E> {
  async fn len(&self) -> QueueSize {
    let state = self.inner.state.read().await;
    QueueSize::Limited(state.count)
  }

  async fn capacity(&self) -> QueueSize {
    let state = self.inner.state.read().await;
    QueueSize::Limited(state.buffer.len())
  }
}

#[async_trait]
impl<E: Element> BlockingQueueWriter<E> for PermitBlockingQueue<E> {
  async fn enqueue(&self, ctx: &Context, element: E) -> Result<(), QueueError<E>> {
    if let Some(cause) = ctx.err() {
      return Err(QueueError::Canceled(cause));
    }
    let permit = tokio::select! {
      cause = ctx.done() => return Err(QueueError::Canceled(cause)),
      permit = self.inner.enqueue_permits.acquire() => permit.expect("permit semaphore is never closed"),
    };
    let mut state = self.inner.state.write().await;
    // The permit may have been granted just as the context fired. Dropping
    // the unforgotten permit returns the unit to its own pool, so capacity
    // is not leaked.
    if let Some(cause) = ctx.err() {
      debug!("context fired after enqueue permit was granted; returning it");
      drop(permit);
      return Err(QueueError::Canceled(cause));
    }
    let tail = state.tail;
    state.buffer[tail] = Some(element);
    state.tail = (tail + 1) % state.buffer.len();
    state.count += 1;
    permit.forget();
    self.inner.dequeue_permits.add_permits(1);
    Ok(())
  }
}

#[async_trait]
impl<E: Element> BlockingQueueReader<E> for PermitBlockingQueue<E> {
  async fn dequeue(&self, ctx: &Context) -> Result<E, QueueError<E>> {
    if let Some(cause) = ctx.err() {
      return Err(QueueError::Canceled(cause));
    }
    let permit = tokio::select! {
      cause = ctx.done() => return Err(QueueError::Canceled(cause)),
      permit = self.inner.dequeue_permits.acquire() => permit.expect("permit semaphore is never closed"),
    };
    let mut state = self.inner.state.write().await;
    if let Some(cause) = ctx.err() {
      debug!("context fired after dequeue permit was granted; returning it");
      drop(permit);
      return Err(QueueError::Canceled(cause));
    }
    let head = state.head;
    let element = state.buffer[head].take().ok_or(QueueError::EmptyQueue)?;
    state.head = (head + 1) % state.buffer.len();
    state.count -= 1;
    permit.forget();
    self.inner.enqueue_permits.add_permits(1);
    Ok(element)
  }
}
