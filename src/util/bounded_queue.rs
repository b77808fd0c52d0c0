//! Generic bounded MPSC queue (component B): blocking `push`/`pop` with a
//! `stop` that wakes every waiter. Used for the session outbound send queue
//! and available for any other backpressure need (e.g. the log sink).
//!
//! Realized on top of `tokio::sync::mpsc::channel` for bounded capacity and
//! FIFO ordering. `stop` is a plain atomic flag plus a `Notify`, not a
//! `Mutex`-guarded close of the receiver: the receiver is parked inside
//! `recv().await` for most of its life, and a `stop()` that needed the same
//! lock `pop()` holds across that await would never be able to acquire it.
//! Registering interest in `stop_notify` before checking the flag (the same
//! pattern the DB pool's `acquire` uses) avoids the lost-wakeup race.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, Mutex, Notify};

/// Error returned once the queue has been stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue is stopped")]
    Stopped,
    #[error("queue is full")]
    Full,
}

pub struct BoundedQueue<T> {
    tx: mpsc::Sender<T>,
    rx: Mutex<mpsc::Receiver<T>>,
    stopped: AtomicBool,
    stop_notify: Notify,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            stopped: AtomicBool::new(false),
            stop_notify: Notify::new(),
        }
    }

    /// Blocking push: waits for capacity. Fails once the queue is stopped.
    pub async fn push(&self, value: T) -> Result<(), QueueError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(QueueError::Stopped);
        }
        self.tx.send(value).await.map_err(|_| QueueError::Stopped)
    }

    /// Non-blocking push used by the send queue's drop-newest backpressure
    /// policy: full means drop, not wait.
    pub fn try_push(&self, value: T) -> Result<(), QueueError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(QueueError::Stopped);
        }
        self.tx.try_send(value).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Stopped,
        })
    }

    /// Blocking pop: waits for an item, or wakes immediately once `stop()`
    /// is called. Drains whatever was already buffered before returning
    /// `None`.
    pub async fn pop(&self) -> Option<T> {
        loop {
            let notified = self.stop_notify.notified();
            if self.stopped.load(Ordering::Acquire) {
                return self.rx.lock().await.try_recv().ok();
            }
            let mut guard = self.rx.lock().await;
            tokio::select! {
                biased;
                item = guard.recv() => return item,
                _ = notified => continue,
            }
        }
    }

    /// Wakes every waiter and makes subsequent `push`/`try_push` fail
    /// immediately; a `pop()` already in flight still drains what's queued.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_then_pop_preserves_order() {
        let q = BoundedQueue::new(4);
        q.push(1).await.unwrap();
        q.push(2).await.unwrap();
        assert_eq!(q.pop().await, Some(1));
        assert_eq!(q.pop().await, Some(2));
    }

    #[tokio::test]
    async fn try_push_fails_when_full() {
        let q = BoundedQueue::new(1);
        q.try_push(1).unwrap();
        assert_eq!(q.try_push(2), Err(QueueError::Full));
    }

    #[tokio::test]
    async fn stop_drains_then_fails() {
        let q = BoundedQueue::new(4);
        q.push(1).await.unwrap();
        q.stop();
        assert_eq!(q.pop().await, Some(1));
        assert_eq!(q.pop().await, None);
    }

    #[tokio::test]
    async fn stop_wakes_a_pop_blocked_on_an_empty_queue() {
        let q = std::sync::Arc::new(BoundedQueue::<i32>::new(4));
        let waiter = q.clone();
        let handle = tokio::spawn(async move { waiter.pop().await });
        tokio::task::yield_now().await;
        q.stop();
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("pop() did not wake up after stop()")
            .unwrap();
        assert_eq!(result, None);
    }
}
