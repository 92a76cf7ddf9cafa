use std::cmp::Ordering;
use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::collections::element::Element;
use crate::context::{Context, ContextError};

mod delay_queue;
mod linked_blocking_queue;
mod permit_blocking_queue;
mod permit_blocking_queue_test;
mod priority_queue;
mod ring_blocking_queue;

pub use self::{
  delay_queue::*, linked_blocking_queue::*, permit_blocking_queue::*, priority_queue::*, ring_blocking_queue::*,
};

/// An error that occurs when a queue operation fails.
#[derive(Error, Debug, PartialEq)]
pub enum QueueError<E> {
  /// The caller's context was cancelled or its deadline passed while the
  /// operation was blocked. The context's cause is passed through
  /// unchanged.
  #[error(transparent)]
  Canceled(#[from] ContextError),
  /// A bounded queue cannot accept the element. The element is handed
  /// back to the caller.
  #[error("queue is out of capacity")]
  OutOfCapacity(E),
  /// Peek or dequeue on an empty queue.
  #[error("queue is empty")]
  EmptyQueue,
}

/// The size of a queue.
#[derive(Debug, Clone)]
pub enum QueueSize {
  /// The queue has no capacity limit.
  Limitless,
  /// The queue has a capacity limit.
  Limited(usize),
}

impl QueueSize {
  /// Returns whether the queue has no capacity limit.
  pub fn is_limitless(&self) -> bool {
    matches!(self, QueueSize::Limitless)
  }

  /// Converts to an option type: `None` when limitless.
  pub fn to_option(&self) -> Option<usize> {
    match self {
      QueueSize::Limitless => None,
      QueueSize::Limited(c) => Some(*c),
    }
  }

  /// Converts to a usize: `usize::MAX` when limitless.
  pub fn to_usize(&self) -> usize {
    match self {
      QueueSize::Limitless => usize::MAX,
      QueueSize::Limited(c) => *c,
    }
  }
}

impl PartialEq<Self> for QueueSize {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (QueueSize::Limitless, QueueSize::Limitless) => true,
      (QueueSize::Limited(l), QueueSize::Limited(r)) => l == r,
      _ => false,
    }
  }
}

impl PartialOrd<Self> for QueueSize {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    match (self, other) {
      (QueueSize::Limitless, QueueSize::Limitless) => Some(Ordering::Equal),
      (QueueSize::Limitless, _) => Some(Ordering::Greater),
      (_, QueueSize::Limitless) => Some(Ordering::Less),
      (QueueSize::Limited(l), QueueSize::Limited(r)) => l.partial_cmp(r),
    }
  }
}

/// A trait that defines the behavior common to all queues.
#[async_trait]
pub trait QueueBase<E: Element>: Debug + Send + Sync {
  /// Returns whether this queue is empty.
  async fn is_empty(&self) -> bool {
    self.len().await == QueueSize::Limited(0)
  }

  /// Returns whether this queue is non-empty.
  async fn non_empty(&self) -> bool {
    !self.is_empty().await
  }

  /// Returns whether the queue size has reached its capacity.
  async fn is_full(&self) -> bool {
    self.capacity().await == self.len().await
  }

  /// Returns whether the queue size has not reached its capacity.
  async fn non_full(&self) -> bool {
    !self.is_full().await
  }

  /// Returns the length of this queue.
  async fn len(&self) -> QueueSize;

  /// Returns the capacity of this queue.
  async fn capacity(&self) -> QueueSize;
}

/// A trait that defines the producer side of a blocking queue.
#[async_trait]
pub trait BlockingQueueWriter<E: Element>: QueueBase<E> {
  /// Inserts the element into this queue, waiting for space to become
  /// available if necessary.
  ///
  /// # Return Value
  /// - `Ok(())` - The element was inserted.
  /// - `Err(QueueError::Canceled(cause))` - `ctx` fired while waiting; the
  ///   queue is left exactly as if the call had never been made.
  async fn enqueue(&self, ctx: &Context, element: E) -> Result<(), QueueError<E>>;
}

/// A trait that defines the consumer side of a blocking queue.
#[async_trait]
pub trait BlockingQueueReader<E: Element>: QueueBase<E> {
  /// Retrieves and deletes the head of this queue, waiting for an element
  /// to become available if necessary.
  ///
  /// # Return Value
  /// - `Ok(element)` - The head element, ownership transferred to the caller.
  /// - `Err(QueueError::Canceled(cause))` - `ctx` fired while waiting; the
  ///   queue is left exactly as if the call had never been made.
  async fn dequeue(&self, ctx: &Context) -> Result<E, QueueError<E>>;
}
