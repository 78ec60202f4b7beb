//! Handle for talking to a running LoRaWAN stack from other tasks.

use super::{AckMode, ControlEvent, Transaction, DEFAULT_APP_PORT, MAX_APP_PAYLOAD};
use crate::engine::{ProtocolEngine, SharedEngine};
use crate::error::Result;
use crate::queue::QueueSender;

/// Values a `send` command falls back to when arguments are omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendDefaults {
    /// Application port.
    pub port: u8,
    /// Delivery mode.
    pub ack: AckMode,
    /// Payload cap; longer payloads are truncated to this.
    pub max_payload: usize,
}

impl Default for SendDefaults {
    fn default() -> Self {
        Self {
            port: DEFAULT_APP_PORT,
            ack: AckMode::Unconfirmed,
            max_payload: MAX_APP_PAYLOAD,
        }
    }
}

/// Producer-side handle of a LoRaWAN stack.
///
/// This is cheaply cloneable and safe to use from any task.
pub struct LorawanHandle<E> {
    control: QueueSender<ControlEvent>,
    transactions: QueueSender<Transaction>,
    engine: SharedEngine<E>,
    defaults: SendDefaults,
}

impl<E> Clone for LorawanHandle<E> {
    fn clone(&self) -> Self {
        Self {
            control: self.control.clone(),
            transactions: self.transactions.clone(),
            engine: self.engine.clone(),
            defaults: self.defaults,
        }
    }
}

impl<E: ProtocolEngine> LorawanHandle<E> {
    pub(super) fn new(
        control: QueueSender<ControlEvent>,
        transactions: QueueSender<Transaction>,
        engine: SharedEngine<E>,
        defaults: SendDefaults,
    ) -> Self {
        Self {
            control,
            transactions,
            engine,
            defaults,
        }
    }

    /// Queue a control event for the run loop.
    ///
    /// Waits for room according to the queue's enqueue policy.
    pub async fn enqueue_control_event(&self, event: ControlEvent) -> Result<()> {
        self.control.send(event).await
    }

    /// Queue an uplink for the run loop.
    ///
    /// Waits for room according to the queue's enqueue policy.
    pub async fn enqueue_transaction(&self, transaction: Transaction) -> Result<()> {
        tracing::debug!(
            "Queueing uplink: port {}, {:?}, {} bytes",
            transaction.port(),
            transaction.ack(),
            transaction.len()
        );
        self.transactions.send(transaction).await
    }

    /// Queue a join request.
    pub async fn join(&self) -> Result<()> {
        self.enqueue_control_event(ControlEvent::Join).await
    }

    /// Stop and reset the MAC immediately, bypassing the queues.
    pub fn reset(&self) {
        tracing::info!("Stopping LoRaWAN MAC");
        self.engine.with(|engine| engine.stop());
    }

    /// Fallback values for the `send` command.
    pub fn defaults(&self) -> SendDefaults {
        self.defaults
    }

    /// Uplinks waiting in the transaction queue.
    pub fn pending_transactions(&self) -> usize {
        self.transactions.pending_count()
    }

    /// Control events waiting in the control queue.
    pub fn pending_control_events(&self) -> usize {
        self.control.pending_count()
    }

    /// The engine behind this stack.
    pub fn engine(&self) -> &SharedEngine<E> {
        &self.engine
    }
}
