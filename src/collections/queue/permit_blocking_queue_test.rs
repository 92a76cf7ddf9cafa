#[cfg(test)]
mod tests {
  use tokio::time::{sleep, Duration, Instant};

  use crate::collections::{
    BlockingQueueReader, BlockingQueueWriter, PermitBlockingQueue, QueueBase, QueueError, QueueSize,
  };
  use crate::context::{Context, ContextError};

  #[derive(Debug, Clone, PartialEq)]
  struct TestElement(i32);

  impl crate::collections::Element for TestElement {}

  #[tokio::test]
  async fn test_new_queue() {
    let queue = PermitBlockingQueue::<TestElement>::new(3);
    assert_eq!(queue.len().await, QueueSize::Limited(0));
    assert_eq!(queue.capacity().await, QueueSize::Limited(3));
  }

  #[tokio::test(start_paused = true)]
  async fn test_dequeue_pool_starts_drained() {
    // The queue starts empty: no dequeue permits exist until a producer
    // hands one over.
    let queue = PermitBlockingQueue::<TestElement>::new(3);
    let ctx = Context::with_timeout(Duration::from_millis(50));
    assert_eq!(
      queue.dequeue(&ctx).await,
      Err(QueueError::Canceled(ContextError::DeadlineExceeded))
    );
  }

  #[tokio::test]
  async fn test_fifo_order() {
    let ctx = Context::background();
    let queue = PermitBlockingQueue::new(8);
    for i in 0..8 {
      queue.enqueue(&ctx, TestElement(i)).await.unwrap();
    }
    for i in 0..8 {
      assert_eq!(queue.dequeue(&ctx).await.unwrap(), TestElement(i));
    }
  }

  #[tokio::test]
  async fn test_wraparound_keeps_enqueue_order() {
    let ctx = Context::background();
    let queue = PermitBlockingQueue::new(3);
    queue.enqueue(&ctx, TestElement(123)).await.unwrap();
    queue.enqueue(&ctx, TestElement(234)).await.unwrap();
    queue.enqueue(&ctx, TestElement(345)).await.unwrap();
    assert_eq!(queue.dequeue(&ctx).await.unwrap(), TestElement(123));
    queue.enqueue(&ctx, TestElement(456)).await.unwrap();
    assert_eq!(
      queue.to_vec().await,
      vec![TestElement(234), TestElement(345), TestElement(456)]
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_enqueue_into_full_queue_times_out_without_leaking_capacity() {
    let queue = PermitBlockingQueue::new(3);
    let ctx = Context::with_timeout(Duration::from_secs(1));
    for i in [123, 234, 345] {
      queue.enqueue(&ctx, TestElement(i)).await.unwrap();
    }

    let start = Instant::now();
    assert_eq!(
      queue.enqueue(&ctx, TestElement(456)).await,
      Err(QueueError::Canceled(ContextError::DeadlineExceeded))
    );
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(queue.len().await, QueueSize::Limited(3));

    // The failed enqueue must not have consumed capacity: after one
    // dequeue, exactly one enqueue fits again.
    let ctx = Context::with_timeout(Duration::from_secs(1));
    queue.dequeue(&ctx).await.unwrap();
    queue.enqueue(&ctx, TestElement(456)).await.unwrap();
    assert_eq!(
      queue.to_vec().await,
      vec![TestElement(234), TestElement(345), TestElement(456)]
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_blocked_enqueue_proceeds_after_a_dequeue() {
    let queue = PermitBlockingQueue::new(1);
    let ctx = Context::with_timeout(Duration::from_secs(1));
    queue.enqueue(&ctx, TestElement(1)).await.unwrap();

    let consumer = {
      let queue = queue.clone();
      tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        let ctx = Context::with_timeout(Duration::from_secs(1));
        queue.dequeue(&ctx).await.unwrap()
      })
    };

    queue.enqueue(&ctx, TestElement(2)).await.unwrap();
    assert_eq!(consumer.await.unwrap(), TestElement(1));
    assert_eq!(queue.to_vec().await, vec![TestElement(2)]);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_producers_and_consumers_lose_nothing() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 25;
    const PER_CONSUMER: usize = PRODUCERS * PER_PRODUCER / CONSUMERS;

    let queue = PermitBlockingQueue::new(5);
    let mut handles = Vec::new();

    for p in 0..PRODUCERS {
      let queue = queue.clone();
      handles.push(tokio::spawn(async move {
        let ctx = Context::with_timeout(Duration::from_secs(10));
        for i in 0..PER_PRODUCER {
          queue.enqueue(&ctx, TestElement((p * PER_PRODUCER + i) as i32)).await.unwrap();
        }
        Vec::new()
      }));
    }
    for _ in 0..CONSUMERS {
      let queue = queue.clone();
      handles.push(tokio::spawn(async move {
        let ctx = Context::with_timeout(Duration::from_secs(10));
        let mut seen = Vec::with_capacity(PER_CONSUMER);
        for _ in 0..PER_CONSUMER {
          seen.push(queue.dequeue(&ctx).await.unwrap().0);
        }
        seen
      }));
    }

    let mut seen = Vec::new();
    for handle in handles {
      seen.extend(handle.await.unwrap());
    }

    seen.sort_unstable();
    let expected: Vec<i32> = (0..(PRODUCERS * PER_PRODUCER) as i32).collect();
    assert_eq!(seen, expected);
    assert!(queue.is_empty().await);
  }
}
