//! Cooperative run loop driving the LoRaWAN engine.
//!
//! Every iteration runs three phases in a fixed order:
//!
//! 1. **Control**: take at most one [`ControlEvent`] and dispatch it.
//! 2. **Transmit**: peek at the head [`Transaction`]; if the engine's busy
//!    gate is closed leave it queued, otherwise remove it and send it.
//! 3. **Advance**: call [`ProtocolEngine::process`] and react to the events
//!    it produced.
//!
//! Then the work-pending signal decides whether the next iteration starts
//! immediately ([`Step::Continue`]) or after yielding to the scheduler
//! ([`Step::Yield`]). Nothing in an iteration blocks; the engine alone
//! decides when the radio may idle.

use bytes::Bytes;

use super::{AckMode, ControlEvent, SendDefaults, Transaction};
use crate::engine::{DeviceClass, EngineEvent, ProtocolEngine, SharedEngine};
use crate::queue::{QueueReceiver, QueueSender};
use crate::signal::WorkPendingSignal;

/// Downlink port carrying MAC commands.
const MAC_COMMAND_PORT: u8 = 0;

/// Downlink port carrying class-change requests.
const CLASS_CHANGE_PORT: u8 = 3;

/// Downlink port reserved for compliance testing.
const COMPLIANCE_PORT: u8 = 224;

/// What the loop does after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Work is pending: run the next iteration without yielding.
    Continue,
    /// Nothing urgent: yield the processor first.
    Yield,
}

/// Counters kept by the run loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed iterations.
    pub iterations: u64,
    /// Iterations that ended by yielding.
    pub yields: u64,
    /// Control events dispatched.
    pub control_events: u64,
    /// Transactions handed to the engine.
    pub uplinks_sent: u64,
    /// Transmit phases skipped because the busy gate was closed.
    pub uplinks_deferred: u64,
    /// Transactions the engine refused.
    pub uplinks_rejected: u64,
}

/// The LoRaWAN task body.
pub struct RunLoop<E> {
    engine: SharedEngine<E>,
    control: QueueReceiver<ControlEvent>,
    transactions: QueueReceiver<Transaction>,
    /// Used to queue the join and class-B announcements without blocking.
    announcer: QueueSender<Transaction>,
    signal: WorkPendingSignal,
    defaults: SendDefaults,
    stats: LoopStats,
    /// Set while the device is in class B or C.
    multicast_started: bool,
}

impl<E: ProtocolEngine> RunLoop<E> {
    pub(super) fn new(
        engine: SharedEngine<E>,
        control: QueueReceiver<ControlEvent>,
        transactions: QueueReceiver<Transaction>,
        announcer: QueueSender<Transaction>,
        signal: WorkPendingSignal,
        defaults: SendDefaults,
    ) -> Self {
        Self {
            engine,
            control,
            transactions,
            announcer,
            signal,
            defaults,
            stats: LoopStats::default(),
            multicast_started: false,
        }
    }

    /// Run forever, yielding whenever no work is pending.
    pub async fn run(mut self) {
        tracing::info!("LoRaWAN application state machine started");

        loop {
            if self.run_once() == Step::Yield {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Execute one full iteration and report whether to yield.
    pub fn run_once(&mut self) -> Step {
        self.handle_control();
        self.handle_uplink();
        self.advance_engine();

        self.stats.iterations += 1;

        if self.signal.take() {
            Step::Continue
        } else {
            self.stats.yields += 1;
            Step::Yield
        }
    }

    /// Counters since the loop was created.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// The engine this loop drives.
    pub fn engine(&self) -> &SharedEngine<E> {
        &self.engine
    }

    /// Whether a multicast session is running (device in class B or C).
    pub fn multicast_started(&self) -> bool {
        self.multicast_started
    }

    fn handle_control(&mut self) {
        let Some(event) = self.control.try_recv() else {
            return;
        };
        self.stats.control_events += 1;

        match event {
            ControlEvent::Join => {
                tracing::info!("Starting LoRaWAN join");
                self.engine.with(|engine| engine.join());
            }
        }
    }

    fn handle_uplink(&mut self) {
        if self.transactions.peek().is_none() {
            return;
        }

        let mut engine = self.engine.lock();
        if engine.is_busy() {
            // Leave it at the head; retried next iteration.
            self.stats.uplinks_deferred += 1;
            tracing::trace!("Engine busy, uplink deferred");
            return;
        }

        let Some(transaction) = self.transactions.try_recv() else {
            return;
        };
        let (port, len) = (transaction.port(), transaction.len());

        match engine.send(transaction) {
            Ok(()) => {
                self.stats.uplinks_sent += 1;
                tracing::debug!("Uplink of {} bytes on port {} handed to engine", len, port);
            }
            Err(e) => {
                self.stats.uplinks_rejected += 1;
                tracing::warn!("Uplink on port {} rejected: {}", port, e);
            }
        }
    }

    fn advance_engine(&mut self) {
        let mut engine = self.engine.lock();
        engine.process();

        while let Some(event) = engine.poll_event() {
            match event {
                EngineEvent::JoinResult { success: false } => {
                    tracing::warn!("LoRaWAN join failed, retrying");
                    engine.join();
                }
                EngineEvent::JoinResult { success: true } => {
                    tracing::info!("LoRaWAN join successful");
                    self.queue_empty_uplink(self.defaults.port);
                }
                EngineEvent::TxDone { port, ack } => {
                    tracing::info!("Uplink on port {} done ({:?})", port, ack);
                }
                EngineEvent::RxData { port, payload } => {
                    handle_downlink(&mut *engine, port, &payload);
                }
                EngineEvent::ClassChanged(class) => {
                    tracing::info!("Switched to class {:?}", class);
                    if class == DeviceClass::B {
                        // Tells the server the device now listens in ping slots.
                        self.queue_empty_uplink(MAC_COMMAND_PORT);
                    }
                    self.multicast_started = class != DeviceClass::A;
                }
            }
        }
    }

    /// Queue an empty unconfirmed uplink without blocking the loop.
    fn queue_empty_uplink(&self, port: u8) {
        let transaction = Transaction::new(AckMode::Unconfirmed, port, Bytes::new());
        if let Err(e) = self.announcer.try_send(transaction) {
            tracing::warn!("Empty uplink on port {} not queued: {}", port, e);
        }
    }
}

fn handle_downlink<E: ProtocolEngine>(engine: &mut E, port: u8, payload: &[u8]) {
    tracing::info!("Downlink of {} bytes on port {}", payload.len(), port);

    match port {
        MAC_COMMAND_PORT => tracing::info!("MAC command received"),
        CLASS_CHANGE_PORT => {
            if let [code] = payload {
                match DeviceClass::from_code(*code) {
                    Some(class) => engine.request_class(class),
                    None => tracing::warn!("Unknown device class code {}", code),
                }
            }
        }
        COMPLIANCE_PORT => match payload.first() {
            Some(0x01) => tracing::info!("Compliance: MAC layer reset requested"),
            Some(0x05) => tracing::info!(
                "Compliance: duty cycle set to {}",
                payload.get(1).copied().unwrap_or(0)
            ),
            _ => {}
        },
        _ => {}
    }
}
