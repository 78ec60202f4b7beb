//! LoRaWAN task: queues, handle and cooperative run loop.
//!
//! Provides:
//! - [`Transaction`] / [`ControlEvent`] - units of work for the engine
//! - [`LorawanHandle`] - enqueue work from any task, reset the MAC
//! - [`RunLoop`] - the task body that drives the engine
//!
//! # Example
//!
//! ```
//! use radiowire::engine::{SharedEngine, sim::SimulatedMac};
//! use radiowire::lorawan::{self, StackConfig, Step};
//! use radiowire::signal::WorkPendingSignal;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> radiowire::error::Result<()> {
//! let irq = WorkPendingSignal::new();
//! let engine = SharedEngine::new(SimulatedMac::new(irq.clone()));
//! let (handle, mut run_loop) = lorawan::stack(engine, irq, StackConfig::default());
//!
//! handle.join().await?;
//! assert_eq!(run_loop.run_once(), Step::Yield);
//! # Ok(())
//! # }
//! ```

mod handle;
mod runner;
mod transaction;

pub use handle::{LorawanHandle, SendDefaults};
pub use runner::{LoopStats, RunLoop, Step};
pub use transaction::{
    AckMode, ControlEvent, Transaction, DEFAULT_APP_PORT, MAX_APP_PAYLOAD, MAX_APP_PORT,
};

use crate::engine::{ProtocolEngine, SharedEngine};
use crate::queue::{self, QueueConfig};
use crate::signal::WorkPendingSignal;

/// Queue sizes and command defaults for one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackConfig {
    /// Transaction queue.
    pub transactions: QueueConfig,
    /// Control-event queue.
    pub control: QueueConfig,
    /// Fallbacks for the `send` command.
    pub defaults: SendDefaults,
}

/// Create the queues for a stack and split them into a handle and a run loop.
///
/// `signal` is the work-pending flag the engine's interrupt raises.
pub fn stack<E: ProtocolEngine>(
    engine: SharedEngine<E>,
    signal: WorkPendingSignal,
    config: StackConfig,
) -> (LorawanHandle<E>, RunLoop<E>) {
    let (control_tx, control_rx) = queue::bounded(config.control);
    let (transaction_tx, transaction_rx) = queue::bounded(config.transactions);

    let handle = LorawanHandle::new(
        control_tx,
        transaction_tx.clone(),
        engine.clone(),
        config.defaults,
    );
    let run_loop = RunLoop::new(
        engine,
        control_rx,
        transaction_rx,
        transaction_tx,
        signal,
        config.defaults,
    );

    (handle, run_loop)
}
