//! Per-partition FIFO of pending requests.
//!
//! The queue also owns the "dispatch loop active" flag for each partition.
//! Pushing onto an idle partition tells the caller to start a loop; popping
//! from an empty partition marks it idle again. Both transitions happen under
//! the same lock, so a partition never has two loops and never strands a task.

use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;

#[derive(Debug)]
struct PartitionQueue<T> {
    pending: VecDeque<T>,
    active: bool,
}

impl<T> Default for PartitionQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            active: false,
        }
    }
}

/// FIFO queues keyed by partition.
#[derive(Debug)]
pub struct RequestQueue<T> {
    partitions: Mutex<HashMap<String, PartitionQueue<T>>>,
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestQueue<T> {
    pub fn new() -> Self {
        Self {
            partitions: Mutex::new(HashMap::new()),
        }
    }

    /// Append a task. Returns `true` when the partition was idle and the
    /// caller is now responsible for running its dispatch loop.
    pub async fn push(&self, partition: &str, task: T) -> bool {
        let mut partitions = self.partitions.lock().await;
        let queue = partitions.entry(partition.to_string()).or_default();
        queue.pending.push_back(task);
        if queue.active {
            false
        } else {
            queue.active = true;
            true
        }
    }

    /// Take the next task. Returns `None` and marks the partition idle when
    /// nothing is left; the dispatch loop must exit on `None`.
    pub async fn pop(&self, partition: &str) -> Option<T> {
        let mut partitions = self.partitions.lock().await;
        let queue = partitions.get_mut(partition)?;
        let task = queue.pending.pop_front();
        if task.is_none() {
            queue.active = false;
        }
        task
    }

    /// Tasks waiting on a partition (excluding the one in flight).
    pub async fn pending(&self, partition: &str) -> usize {
        self.partitions
            .lock()
            .await
            .get(partition)
            .map(|q| q.pending.len())
            .unwrap_or(0)
    }

    /// Whether a dispatch loop currently owns the partition.
    pub async fn is_active(&self, partition: &str) -> bool {
        self.partitions
            .lock()
            .await
            .get(partition)
            .map(|q| q.active)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_push_starts_loop() {
        let queue = RequestQueue::new();
        assert!(queue.push("eun1", 1).await);
        assert!(!queue.push("eun1", 2).await);
        assert!(!queue.push("eun1", 3).await);
        assert!(queue.is_active("eun1").await);
        assert_eq!(queue.pending("eun1").await, 3);
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = RequestQueue::new();
        for i in 0..5 {
            queue.push("europe", i).await;
        }
        let mut drained = Vec::new();
        while let Some(task) = queue.pop("europe").await {
            drained.push(task);
        }
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_empty_pop_marks_idle() {
        let queue = RequestQueue::new();
        queue.push("kr", "a").await;
        assert_eq!(queue.pop("kr").await, Some("a"));
        assert!(queue.is_active("kr").await);
        assert_eq!(queue.pop("kr").await, None);
        assert!(!queue.is_active("kr").await);

        // Next push has to start a new loop.
        assert!(queue.push("kr", "b").await);
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let queue = RequestQueue::new();
        assert!(queue.push("eun1", 1).await);
        assert!(queue.push("europe", 2).await);
        assert_eq!(queue.pop("europe").await, Some(2));
        assert_eq!(queue.pending("eun1").await, 1);
        assert_eq!(queue.pop("unknown").await, None);
    }
}
