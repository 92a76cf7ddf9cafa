use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

use crate::collections::queue::{QueueError, QueueSize};

/// A three-way ordering function: `Less` means the first argument sorts
/// before the second.
pub type Comparator<E> = Box<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

/// A comparator-driven priority queue over an implicit binary heap,
/// capacity-bounded or unbounded.
///
/// The head is always the element the comparator sorts first. Enqueue on a
/// full bounded queue fails fast with [`QueueError::OutOfCapacity`],
/// handing the element back; peek and dequeue on an empty queue fail with
/// [`QueueError::EmptyQueue`].
///
/// Not internally synchronized: callers sharing one instance across tasks
/// must guard it with a lock, the way [`DelayQueue`] does.
///
/// [`DelayQueue`]: crate::collections::DelayQueue
pub struct PriorityQueue<E> {
  data: Vec<E>,
  capacity: QueueSize,
  comparator: Comparator<E>,
}

impl<E: Debug> Debug for PriorityQueue<E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PriorityQueue")
      .field("data", &self.data)
      .field("capacity", &self.capacity)
      .finish()
  }
}

impl<E> PriorityQueue<E> {
  pub fn new(capacity: QueueSize, comparator: impl Fn(&E, &E) -> Ordering + Send + Sync + 'static) -> Self {
    if let QueueSize::Limited(limit) = &capacity {
      assert!(*limit > 0, "Capacity must be greater than zero");
    }
    Self {
      data: Vec::new(),
      capacity,
      comparator: Box::new(comparator),
    }
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn capacity(&self) -> QueueSize {
    self.capacity.clone()
  }

  /// Inserts the element and restores the heap invariant.
  pub fn enqueue(&mut self, element: E) -> Result<(), QueueError<E>> {
    if let QueueSize::Limited(limit) = &self.capacity {
      if self.data.len() >= *limit {
        return Err(QueueError::OutOfCapacity(element));
      }
    }
    self.data.push(element);
    self.sift_up(self.data.len() - 1);
    Ok(())
  }

  /// Removes and returns the head element.
  pub fn dequeue(&mut self) -> Result<E, QueueError<E>> {
    if self.data.is_empty() {
      return Err(QueueError::EmptyQueue);
    }
    let element = self.data.swap_remove(0);
    if !self.data.is_empty() {
      self.sift_down(0);
    }
    Ok(element)
  }

  /// Returns the head element without removing it.
  pub fn peek(&self) -> Result<&E, QueueError<E>> {
    self.data.first().ok_or(QueueError::EmptyQueue)
  }

  /// Snapshot of the backing storage. Heap layout order, not sorted order.
  pub fn to_vec(&self) -> Vec<E>
  where
    E: Clone,
  {
    self.data.to_vec()
  }

  fn sift_up(&mut self, index: usize) {
    let mut index = index;
    while index > 0 {
      let parent = (index - 1) / 2;
      if (self.comparator)(&self.data[parent], &self.data[index]) != Ordering::Greater {
        break;
      }
      self.data.swap(parent, index);
      index = parent;
    }
  }

  fn sift_down(&mut self, index: usize) {
    let mut index = index;
    loop {
      let left = index * 2 + 1;
      if left >= self.data.len() {
        break;
      }
      // Left child wins ties, so the choice is deterministic.
      let right = left + 1;
      let mut child = left;
      if right < self.data.len() && (self.comparator)(&self.data[right], &self.data[left]) == Ordering::Less {
        child = right;
      }
      if (self.comparator)(&self.data[child], &self.data[index]) == Ordering::Less {
        self.data.swap(child, index);
        index = child;
      } else {
        break;
      }
    }
  }
}
