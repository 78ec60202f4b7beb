//! Bounded FIFO queues between the command path and a run loop.
//!
//! Producers (console commands, any task) hold a cloneable [`QueueSender`];
//! the run loop owns the single [`QueueReceiver`] and only ever polls it
//! without blocking.
//!
//! # Architecture
//!
//! ```text
//! console task ─┐      slots (N permits)
//! other task   ─┼─► QueueSender<T> ─► mpsc ─► [head slot] ─► run loop
//! run loop     ─┘   (send / try_send)          (peek / try_recv)
//! ```
//!
//! The head slot is what makes [`QueueReceiver::peek`] possible on top of a
//! channel: an element pulled out to be inspected stays there, still first in
//! line, until [`QueueReceiver::try_recv`] takes it.
//!
//! Capacity is held by a semaphore rather than by the channel. A sender takes
//! one permit per element and only `try_recv` gives it back, so a parked head
//! still counts against the capacity and the queue never holds more than `N`.
//!
//! # Back-pressure
//!
//! [`EnqueuePolicy::Block`] suspends the producer until there is room, with
//! no upper bound. [`EnqueuePolicy::Timeout`] bounds that wait and reports
//! [`RadiowireError::QueueFull`] when it expires.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore, TryAcquireError};

use crate::error::{RadiowireError, Result};

/// Default number of slots per queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// What `send` does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnqueuePolicy {
    /// Suspend the producer until a slot frees up, however long that takes.
    #[default]
    Block,
    /// Suspend for at most this long, then fail with `QueueFull`.
    Timeout(Duration),
}

/// Configuration for one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Number of slots.
    pub capacity: usize,
    /// Behaviour of `send` on a full queue.
    pub policy: EnqueuePolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            policy: EnqueuePolicy::Block,
        }
    }
}

/// Create a bounded queue.
///
/// # Panics
///
/// Panics if `config.capacity` is zero.
pub fn bounded<T>(config: QueueConfig) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(config.capacity);
    let slots = Arc::new(Semaphore::new(config.capacity));
    let pending = Arc::new(AtomicUsize::new(0));

    let sender = QueueSender {
        tx,
        slots: slots.clone(),
        pending: pending.clone(),
        capacity: config.capacity,
        policy: config.policy,
    };
    let receiver = QueueReceiver {
        rx,
        head: None,
        slots,
        pending,
    };

    (sender, receiver)
}

/// Producer side of a queue.
///
/// This is cheaply cloneable and can be shared across tasks.
pub struct QueueSender<T> {
    tx: mpsc::Sender<T>,
    /// One permit per free slot; a parked head keeps its permit.
    slots: Arc<Semaphore>,
    /// Elements enqueued but not yet removed (including a peeked head).
    pending: Arc<AtomicUsize>,
    capacity: usize,
    policy: EnqueuePolicy,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            slots: self.slots.clone(),
            pending: self.pending.clone(),
            capacity: self.capacity,
            policy: self.policy,
        }
    }
}

impl<T> QueueSender<T> {
    /// Enqueue an element, waiting for room according to the policy.
    pub async fn send(&self, item: T) -> Result<()> {
        let permit = match self.policy {
            EnqueuePolicy::Block => self.slots.acquire().await,
            EnqueuePolicy::Timeout(timeout) => {
                tokio::time::timeout(timeout, self.slots.acquire())
                    .await
                    .map_err(|_| RadiowireError::QueueFull)?
            }
        }
        .map_err(|_| RadiowireError::QueueClosed)?;

        // The slot now belongs to the element; `try_recv` returns it.
        permit.forget();
        self.push(item)
    }

    /// Enqueue without waiting.
    ///
    /// Returns `Err(QueueFull)` immediately if every slot is taken.
    pub fn try_send(&self, item: T) -> Result<()> {
        let permit = self.slots.try_acquire().map_err(|e| match e {
            TryAcquireError::NoPermits => RadiowireError::QueueFull,
            TryAcquireError::Closed => RadiowireError::QueueClosed,
        })?;

        permit.forget();
        self.push(item)
    }

    /// Hand an element that already holds a slot to the channel.
    fn push(&self, item: T) -> Result<()> {
        // Counted before the receiver can see it, so `try_recv` never
        // decrements below zero.
        self.pending.fetch_add(1, Ordering::AcqRel);

        self.tx.try_send(item).map_err(|e| {
            self.pending.fetch_sub(1, Ordering::Release);
            self.slots.add_permits(1);
            match e {
                mpsc::error::TrySendError::Full(_) => RadiowireError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => RadiowireError::QueueClosed,
            }
        })
    }

    /// Number of elements waiting to be consumed.
    ///
    /// Producers still waiting for a slot are not counted, so this never
    /// exceeds the capacity.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Check whether a `send` would have to wait right now.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.available_permits() == 0
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The configured full-queue behaviour.
    #[inline]
    pub fn policy(&self) -> EnqueuePolicy {
        self.policy
    }
}

/// Consumer side of a queue. Owned by exactly one run loop.
pub struct QueueReceiver<T> {
    rx: mpsc::Receiver<T>,
    /// Element pulled from the channel by `peek` but not yet taken.
    head: Option<T>,
    slots: Arc<Semaphore>,
    pending: Arc<AtomicUsize>,
}

impl<T> QueueReceiver<T> {
    /// Look at the head element without removing it. Never blocks.
    pub fn peek(&mut self) -> Option<&T> {
        self.fill_head();
        self.head.as_ref()
    }

    /// Remove and return the head element. Never blocks.
    pub fn try_recv(&mut self) -> Option<T> {
        self.fill_head();
        let item = self.head.take();
        if item.is_some() {
            self.pending.fetch_sub(1, Ordering::Release);
            self.slots.add_permits(1);
        }
        item
    }

    /// Number of elements waiting, including a peeked head.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    fn fill_head(&mut self) {
        if self.head.is_none() {
            // Empty and Disconnected both mean "nothing available now".
            self.head = self.rx.try_recv().ok();
        }
    }
}

impl<T> Drop for QueueReceiver<T> {
    fn drop(&mut self) {
        // Wake producers waiting for a slot; they get `QueueClosed`.
        self.slots.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn small(capacity: usize) -> QueueConfig {
        QueueConfig {
            capacity,
            policy: EnqueuePolicy::Block,
        }
    }

    #[test]
    fn test_queue_config_default() {
        let config = QueueConfig::default();
        assert_eq!(config.capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.policy, EnqueuePolicy::Block);
    }

    #[test]
    fn test_empty_queue_polls_none() {
        let (_tx, mut rx) = bounded::<u32>(small(4));
        assert!(rx.peek().is_none());
        assert!(rx.try_recv().is_none());
        assert_eq!(rx.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (tx, mut rx) = bounded(small(4));
        for i in 1..=3u32 {
            tx.send(i).await.unwrap();
        }

        assert_eq!(rx.try_recv(), Some(1));
        assert_eq!(rx.try_recv(), Some(2));
        assert_eq!(rx.try_recv(), Some(3));
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn test_peek_keeps_head_in_place() {
        let (tx, mut rx) = bounded(small(4));
        tx.send("first").await.unwrap();
        tx.send("second").await.unwrap();

        assert_eq!(rx.peek(), Some(&"first"));
        assert_eq!(rx.peek(), Some(&"first"));
        assert_eq!(rx.pending_count(), 2);

        assert_eq!(rx.try_recv(), Some("first"));
        assert_eq!(rx.peek(), Some(&"second"));
        assert_eq!(rx.pending_count(), 1);
    }

    #[test]
    fn test_try_send_at_capacity() {
        let (tx, _rx) = bounded(small(2));
        tx.try_send(1u8).unwrap();
        tx.try_send(2u8).unwrap();

        assert!(tx.is_full());
        assert!(matches!(tx.try_send(3u8), Err(RadiowireError::QueueFull)));
        assert_eq!(tx.pending_count(), 2);
    }

    #[test]
    fn test_try_send_closed() {
        let (tx, rx) = bounded(small(2));
        drop(rx);
        assert!(matches!(tx.try_send(1u8), Err(RadiowireError::QueueClosed)));
        assert_eq!(tx.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_timeout_when_full() {
        let (tx, _rx) = bounded(QueueConfig {
            capacity: 1,
            policy: EnqueuePolicy::Timeout(Duration::from_millis(10)),
        });
        tx.send(1u8).await.unwrap();

        let start = Instant::now();
        let result = tx.send(2u8).await;

        assert!(matches!(result, Err(RadiowireError::QueueFull)));
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(tx.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_blocking_send_resumes_after_consume() {
        let (tx, mut rx) = bounded(small(1));
        tx.send(1u8).await.unwrap();

        let producer = tx.clone();
        let blocked = tokio::spawn(async move { producer.send(2u8).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!blocked.is_finished());

        assert_eq!(rx.try_recv(), Some(1));
        blocked.await.unwrap().unwrap();
        assert_eq!(rx.try_recv(), Some(2));
    }

    #[tokio::test]
    async fn test_peeked_head_keeps_its_slot() {
        let (tx, mut rx) = bounded(QueueConfig {
            capacity: 2,
            policy: EnqueuePolicy::Timeout(Duration::from_millis(20)),
        });
        tx.send(1u8).await.unwrap();
        tx.send(2u8).await.unwrap();

        assert_eq!(rx.peek(), Some(&1));
        assert!(tx.is_full());
        assert!(matches!(tx.try_send(3u8), Err(RadiowireError::QueueFull)));
        assert!(matches!(tx.send(3u8).await, Err(RadiowireError::QueueFull)));
        assert_eq!(tx.pending_count(), 2);

        assert_eq!(rx.try_recv(), Some(1));
        tx.try_send(3u8).unwrap();
        assert_eq!(rx.try_recv(), Some(2));
        assert_eq!(rx.try_recv(), Some(3));
    }

    #[tokio::test]
    async fn test_waiting_producer_not_pending() {
        let (tx, _rx) = bounded(small(1));
        tx.send(1u8).await.unwrap();

        let producer = tx.clone();
        let blocked = tokio::spawn(async move { producer.send(2u8).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!blocked.is_finished());
        assert_eq!(tx.pending_count(), 1);
        blocked.abort();
    }

    #[tokio::test]
    async fn test_receiver_drop_wakes_blocked_sender() {
        let (tx, rx) = bounded(small(1));
        tx.send(1u8).await.unwrap();

        let producer = tx.clone();
        let blocked = tokio::spawn(async move { producer.send(2u8).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(rx);
        assert!(matches!(
            blocked.await.unwrap(),
            Err(RadiowireError::QueueClosed)
        ));
    }

    #[test]
    fn test_clone_shares_queue() {
        let (tx1, mut rx) = bounded(small(4));
        let tx2 = tx1.clone();

        tx1.try_send('a').unwrap();
        tx2.try_send('b').unwrap();

        assert_eq!(tx1.pending_count(), 2);
        assert_eq!(rx.try_recv(), Some('a'));
        assert_eq!(rx.try_recv(), Some('b'));
        assert_eq!(tx2.pending_count(), 0);
    }
}
