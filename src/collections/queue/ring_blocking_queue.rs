use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collections::element::Element;
use crate::collections::queue::{BlockingQueueReader, BlockingQueueWriter, QueueBase, QueueError, QueueSize};
use crate::concurrent::WaitSignal;
use crate::context::Context;

#[derive(Debug)]
struct RingState<E> {
  buffer: Vec<Option<E>>,
  head: usize,
  tail: usize,
  count: usize,
  not_empty: WaitSignal,
  not_full: WaitSignal,
}

impl<E> RingState<E> {
  fn is_full(&self) -> bool {
    self.count == self.buffer.len()
  }
}

/// A fixed-capacity blocking queue over a ring buffer.
///
/// Producers block while the queue is full, consumers while it is empty;
/// both respect the caller's [`Context`]. Wakeups are broadcast through a
/// [`WaitSignal`] per direction, so woken tasks race to re-acquire the
/// lock and must re-check their condition — every wait is a loop.
///
/// Elements are dequeued in the exact order they were enqueued.
#[derive(Debug, Clone)]
pub struct RingBlockingQueue<E> {
  inner: Arc<RwLock<RingState<E>>>,
}

impl<E: Element> RingBlockingQueue<E> {
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "Capacity must be greater than zero");
    let mut buffer = Vec::with_capacity(capacity);
    buffer.resize_with(capacity, || None);
    Self {
      inner: Arc::new(RwLock::new(RingState {
        buffer,
        head: 0,
        tail: 0,
        count: 0,
        not_empty: WaitSignal::new(),
        not_full: WaitSignal::new(),
      })),
    }
  }

  /// Snapshot of the current elements in enqueue order, regardless of
  /// where they sit in the physical buffer.
  pub async fn to_vec(&self) -> Vec<E>
  where
    E: Clone,
  {
    let state = self.inner.read().await;
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
impl<E: Element> QueueBase<E> for RingBlockingQueue<E> {
  async fn len(&self) -> QueueSize {
    let state = self.inner.read().await;
    QueueSize::Limited(state.count)
  }

  async fn capacity(&self) -> QueueSize {
    let state = self.inner.read().await;
    QueueSize::Limited(state.buffer.len())
  }
}

#[async_trait]
impl<E: Element> BlockingQueueWriter<E> for RingBlockingQueue<E> {
  async fn enqueue(&self, ctx: &Context, element: E) -> Result<(), QueueError<E>> {
    if let Some(cause) = ctx.err() {
      return Err(QueueError::Canceled(cause));
    }
    let mut state = self.inner.write().await;
    // Woken tasks race with other producers for the lock, so fullness must
    // be re-checked after every wake.
    while state.is_full() {
      let handle = state.not_full.wait_handle();
      drop(state);
      tokio::select! {
        cause = ctx.done() => return Err(QueueError::Canceled(cause)),
        _ = handle => {}
      }
      state = self.inner.write().await;
    }
    let tail = state.tail;
    state.buffer[tail] = Some(element);
    state.tail = (tail + 1) % state.buffer.len();
    state.count += 1;
    state.not_empty.notify_all();
    Ok(())
  }
}

#[async_trait]
impl<E: Element> BlockingQueueReader<E> for RingBlockingQueue<E> {
  async fn dequeue(&self, ctx: &Context) -> Result<E, QueueError<E>> {
    if let Some(cause) = ctx.err() {
      return Err(QueueError::Canceled(cause));
    }
    let mut state = self.inner.write().await;
    while state.count == 0 {
      let handle = state.not_empty.wait_handle();
      drop(state);
      tokio::select! {
        cause = ctx.done() => return Err(QueueError::Canceled(cause)),
        _ = handle => {}
      }
      state = self.inner.write().await;
    }
    let head = state.head;
    // take() resets the slot so the queue no longer retains the value.
    let element = state.buffer[head].take().ok_or(QueueError::EmptyQueue)?;
    state.head = (head + 1) % state.buffer.len();
    state.count -= 1;
    state.not_full.notify_all();
    Ok(element)
  }
}
