use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collections::element::Element;
use crate::collections::linked_list::LinkedList;
use crate::collections::queue::{BlockingQueueReader, BlockingQueueWriter, QueueBase, QueueError, QueueSize};
use crate::concurrent::WaitSignal;
use crate::context::Context;

#[derive(Debug)]
struct LinkedState<E> {
  list: LinkedList<E>,
  not_empty: WaitSignal,
  not_full: WaitSignal,
}

#[derive(Debug)]
struct Inner<E> {
  max_size: QueueSize,
  state: RwLock<LinkedState<E>>,
}

/// A blocking FIFO queue over linked storage, bounded by element count or
/// unbounded.
///
/// The blocking protocol is the same as [`RingBlockingQueue`]'s; storage
/// delegates to [`LinkedList`]. The capacity check and the mutation share
/// one critical section, so a bounded queue never overshoots its limit.
///
/// [`RingBlockingQueue`]: crate::collections::RingBlockingQueue
#[derive(Debug, Clone)]
pub struct LinkedBlockingQueue<E> {
  inner: Arc<Inner<E>>,
}

impl<E: Element> LinkedBlockingQueue<E> {
  /// A queue holding at most `capacity` elements.
  pub fn bounded(capacity: usize) -> Self {
    assert!(capacity > 0, "Capacity must be greater than zero");
    Self::with_max_size(QueueSize::Limited(capacity))
  }

  /// A queue with no capacity limit; enqueue never blocks.
  pub fn unbounded() -> Self {
    Self::with_max_size(QueueSize::Limitless)
  }

  fn with_max_size(max_size: QueueSize) -> Self {
    Self {
      inner: Arc::new(Inner {
        max_size,
        state: RwLock::new(LinkedState {
          list: LinkedList::new(),
          not_empty: WaitSignal::new(),
          not_full: WaitSignal::new(),
        }),
      }),
    }
  }

  /// Snapshot of the current elements in enqueue order.
  pub async fn to_vec(&self) -> Vec<E>
  where
    E: Clone,
  {
    let state = self.inner.state.read().await;
    state.list.to_vec()
  }

  fn is_full(&self, state: &LinkedState<E>) -> bool {
    match self.inner.max_size {
      QueueSize::Limitless => false,
      QueueSize::Limited(max) => state.list.len() >= max,
    }
  }
}

#[async_trait]
impl<E: Element> QueueBase<E> for LinkedBlockingQueue<E> {
  async fn len(&self) -> QueueSize {
    let state = self.inner.state.read().await;
    QueueSize::Limited(state.list.len())
  }

  async fn capacity(&self) -> QueueSize {
    self.inner.max_size.clone()
  }
}

#[async_trait]
impl<E: Element> BlockingQueueWriter<E> for LinkedBlockingQueue<E> {
  async fn enqueue(&self, ctx: &Context, element: E) -> Result<(), QueueError<E>> {
    if let Some(cause) = ctx.err() {
      return Err(QueueError::Canceled(cause));
    }
    let mut state = self.inner.state.write().await;
    while self.is_full(&state) {
      let handle = state.not_full.wait_handle();
      drop(state);
      tokio::select! {
        cause = ctx.done() => return Err(QueueError::Canceled(cause)),
        _ = handle => {}
      }
      state = self.inner.state.write().await;
    }
    state.list.append(element);
    state.not_empty.notify_all();
    Ok(())
  }
}

#[async_trait]
impl<E: Element> BlockingQueueReader<E> for LinkedBlockingQueue<E> {
  async fn dequeue(&self, ctx: &Context) -> Result<E, QueueError<E>> {
    if let Some(cause) = ctx.err() {
      return Err(QueueError::Canceled(cause));
    }
    let mut state = self.inner.state.write().await;
    while state.list.is_empty() {
      let handle = state.not_empty.wait_handle();
      drop(state);
      tokio::select! {
        cause = ctx.done() => return Err(QueueError::Canceled(cause)),
        _ = handle => {}
      }
      state = self.inner.state.write().await;
    }
    let element = state.list.delete(0).map_err(|_| QueueError::EmptyQueue)?;
    state.not_full.notify_all();
    Ok(element)
  }
}
