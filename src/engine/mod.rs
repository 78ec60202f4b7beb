//! Protocol engine interface.
//!
//! The wide-area protocol engine (join procedure, retransmissions, MAC
//! timers, radio driver) lives outside this crate. The run loop drives it
//! through [`ProtocolEngine`]:
//!
//! - [`ProtocolEngine::join`] / [`ProtocolEngine::send`] start operations
//! - [`ProtocolEngine::is_busy`] is the busy gate consulted before every send
//! - [`ProtocolEngine::process`] advances the engine one step
//! - [`ProtocolEngine::poll_event`] drains what happened during that step
//!
//! None of these calls may block; the engine decides internally when the
//! radio may idle.
//!
//! # Example
//!
//! ```
//! use radiowire::engine::{ProtocolEngine, SharedEngine, sim::SimulatedMac};
//! use radiowire::signal::WorkPendingSignal;
//!
//! let engine = SharedEngine::new(SimulatedMac::new(WorkPendingSignal::new()));
//! engine.with(|mac| mac.join());
//! assert!(!engine.with(|mac| mac.is_joined()));
//! ```

pub mod sim;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::lorawan::{AckMode, Transaction};

/// Failure reported by an engine when it refuses an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Uplink requested before the device joined a network.
    #[error("not joined")]
    NotJoined,

    /// Payload larger than the current data rate allows.
    #[error("payload of {0} bytes too large")]
    PayloadTooLarge(usize),

    /// Radio or MAC layer failure.
    #[error("radio: {0}")]
    Radio(String),
}

/// LoRaWAN device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    /// Receive windows only after uplinks.
    #[default]
    A,
    /// Scheduled ping slots synchronised to beacons.
    B,
    /// Receiver open whenever not transmitting.
    C,
}

impl DeviceClass {
    /// Map the one-byte class code used by the downlink class-change request.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DeviceClass::A),
            1 => Some(DeviceClass::B),
            2 => Some(DeviceClass::C),
            _ => None,
        }
    }
}

/// Regional parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    As923,
    Au915,
    Cn470,
    Cn779,
    Eu433,
    Eu868,
    In865,
    Kr920,
    Ru864,
    #[default]
    Us915,
}

impl Region {
    /// Regions whose regulations impose transmit duty-cycle limits.
    pub fn requires_duty_cycle(self) -> bool {
        matches!(self, Region::Eu868 | Region::Ru864 | Region::Cn779)
    }
}

/// Parameters handed to the engine at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineParams {
    /// Regional parameter set.
    pub region: Region,
    /// Adaptive data rate.
    pub adr: bool,
    /// Uplink data rate index when ADR is off.
    pub tx_datarate: u8,
    /// Public (vs private) network sync word.
    pub public_network: bool,
    /// Enforce regional duty-cycle limits.
    pub duty_cycle: bool,
    /// Application buffer size.
    pub max_payload: usize,
    /// Receive window timing error budget in milliseconds.
    pub max_rx_error_ms: u32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            region: Region::Us915,
            adr: true,
            tx_datarate: 3,
            public_network: true,
            duty_cycle: false,
            max_payload: crate::lorawan::MAX_APP_PAYLOAD,
            max_rx_error_ms: 20,
        }
    }
}

/// Notification produced by the engine while processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The join procedure finished.
    JoinResult {
        /// Whether the network accepted the device.
        success: bool,
    },
    /// An uplink left the radio (and was acknowledged, if confirmed).
    TxDone {
        /// Port it was sent on.
        port: u8,
        /// Delivery mode it was sent with.
        ack: AckMode,
    },
    /// A downlink arrived.
    RxData {
        /// Downlink port (0 carries MAC commands).
        port: u8,
        /// Application payload.
        payload: Bytes,
    },
    /// The device switched class.
    ClassChanged(DeviceClass),
}

/// Wide-area protocol engine driven by a cooperative run loop.
pub trait ProtocolEngine: Send + 'static {
    /// Start the network join procedure.
    fn join(&mut self);

    /// Hand one uplink to the engine. Only called while not busy.
    fn send(&mut self, transaction: Transaction) -> Result<(), EngineError>;

    /// The busy gate: `true` while a previous uplink is outstanding.
    fn is_busy(&self) -> bool;

    /// Advance timers, state transitions and radio interaction by one step.
    fn process(&mut self);

    /// Stop and reset the MAC.
    fn stop(&mut self);

    /// Switch device class.
    fn request_class(&mut self, _class: DeviceClass) {}

    /// Take the next notification produced by `process`.
    fn poll_event(&mut self) -> Option<EngineEvent> {
        None
    }
}

/// An engine shared between its run loop and direct console operations.
///
/// Locks are short and never held across an `.await`.
pub struct SharedEngine<E> {
    inner: Arc<Mutex<E>>,
}

impl<E> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E> SharedEngine<E> {
    /// Wrap an engine.
    pub fn new(engine: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine.
    ///
    /// A panic while holding the lock does not make the engine unusable.
    pub fn lock(&self) -> MutexGuard<'_, E> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut self.lock())
    }
}
