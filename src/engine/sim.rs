//! In-process LoRaWAN MAC simulation.
//!
//! Stands in for the real stack on a host: joins succeed after a fixed
//! number of `process` steps, an uplink holds the busy gate closed for a
//! configurable number of steps, and every completion raises the
//! work-pending signal the way the radio interrupt would.

use std::collections::VecDeque;

use bytes::Bytes;

use super::{DeviceClass, EngineError, EngineEvent, EngineParams, ProtocolEngine};
use crate::lorawan::{AckMode, Transaction};
use crate::signal::WorkPendingSignal;

/// Default number of `process` steps a join takes.
pub const DEFAULT_JOIN_STEPS: u32 = 3;

/// Default number of `process` steps an uplink keeps the engine busy.
pub const DEFAULT_TX_STEPS: u32 = 5;

#[derive(Debug)]
struct InFlight {
    port: u8,
    ack: AckMode,
    remaining: u32,
}

/// Simulated MAC layer.
#[derive(Debug)]
pub struct SimulatedMac {
    irq: WorkPendingSignal,
    params: EngineParams,
    join_steps: u32,
    tx_steps: u32,
    /// Join attempts that are rejected before one succeeds.
    failing_joins: u32,
    join_attempts: u32,
    join_remaining: Option<u32>,
    joined: bool,
    class: DeviceClass,
    in_flight: Option<InFlight>,
    downlinks: VecDeque<(u8, Bytes)>,
    events: VecDeque<EngineEvent>,
    sent: Vec<Transaction>,
}

impl SimulatedMac {
    /// Create a simulated MAC with default parameters.
    pub fn new(irq: WorkPendingSignal) -> Self {
        Self::with_params(irq, EngineParams::default())
    }

    /// Create a simulated MAC with explicit parameters.
    pub fn with_params(irq: WorkPendingSignal, params: EngineParams) -> Self {
        tracing::debug!(
            "Simulated MAC: region {:?}, ADR {}, DR{}, duty cycle {}",
            params.region,
            params.adr,
            params.tx_datarate,
            params.duty_cycle
        );
        Self {
            irq,
            params,
            join_steps: DEFAULT_JOIN_STEPS,
            tx_steps: DEFAULT_TX_STEPS,
            failing_joins: 0,
            join_attempts: 0,
            join_remaining: None,
            joined: false,
            class: DeviceClass::A,
            in_flight: None,
            downlinks: VecDeque::new(),
            events: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    /// Set how many `process` steps a join takes.
    pub fn join_steps(mut self, steps: u32) -> Self {
        self.join_steps = steps;
        self
    }

    /// Set how many `process` steps an uplink keeps the engine busy.
    pub fn tx_steps(mut self, steps: u32) -> Self {
        self.tx_steps = steps;
        self
    }

    /// Reject the first `count` join attempts.
    pub fn failing_joins(mut self, count: u32) -> Self {
        self.failing_joins = count;
        self
    }

    /// Deliver a downlink in the receive window after the next uplink.
    pub fn queue_downlink(&mut self, port: u8, payload: impl Into<Bytes>) {
        self.downlinks.push_back((port, payload.into()));
    }

    /// Whether the device has joined.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Number of join attempts started.
    pub fn join_attempts(&self) -> u32 {
        self.join_attempts
    }

    /// Current device class.
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Every uplink accepted so far, oldest first.
    pub fn sent(&self) -> &[Transaction] {
        &self.sent
    }

    fn step_join(&mut self) {
        let Some(remaining) = self.join_remaining else {
            return;
        };
        if remaining > 0 {
            self.join_remaining = Some(remaining - 1);
            return;
        }

        self.join_remaining = None;
        let success = self.join_attempts > self.failing_joins;
        self.joined = success;
        self.events.push_back(EngineEvent::JoinResult { success });
        self.irq.raise();
    }

    fn step_uplink(&mut self) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };
        if in_flight.remaining > 0 {
            in_flight.remaining -= 1;
            return;
        }

        let done = EngineEvent::TxDone {
            port: in_flight.port,
            ack: in_flight.ack,
        };
        self.in_flight = None;
        self.events.push_back(done);

        if let Some((port, payload)) = self.downlinks.pop_front() {
            self.events.push_back(EngineEvent::RxData { port, payload });
        }
        self.irq.raise();
    }
}

impl ProtocolEngine for SimulatedMac {
    fn join(&mut self) {
        if self.join_remaining.is_some() {
            tracing::debug!("Simulated MAC: join already in progress");
            return;
        }
        self.join_attempts += 1;
        self.join_remaining = Some(self.join_steps);
    }

    fn send(&mut self, transaction: Transaction) -> Result<(), EngineError> {
        if !self.joined {
            return Err(EngineError::NotJoined);
        }
        if transaction.len() > self.params.max_payload {
            return Err(EngineError::PayloadTooLarge(transaction.len()));
        }
        if self.in_flight.is_some() {
            return Err(EngineError::Radio("uplink already in flight".into()));
        }

        self.in_flight = Some(InFlight {
            port: transaction.port(),
            ack: transaction.ack(),
            remaining: self.tx_steps,
        });
        self.sent.push(transaction);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn process(&mut self) {
        self.step_join();
        self.step_uplink();
    }

    fn stop(&mut self) {
        tracing::debug!("Simulated MAC: stopped");
        self.joined = false;
        self.join_remaining = None;
        self.in_flight = None;
        self.class = DeviceClass::A;
        self.events.clear();
    }

    fn request_class(&mut self, class: DeviceClass) {
        if class != self.class {
            self.class = class;
            self.events.push_back(EngineEvent::ClassChanged(class));
        }
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }
}
