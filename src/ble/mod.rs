//! Short-range link task.
//!
//! The BLE host stack runs its own event dispatcher; this task only has to
//! keep calling it. It follows the same signal-or-yield rule as the LoRaWAN
//! [`RunLoop`](crate::lorawan::RunLoop), without any queues: console
//! commands act on the stack directly through [`SharedEngine`].

pub mod sim;

use crate::engine::SharedEngine;
use crate::lorawan::Step;
use crate::signal::WorkPendingSignal;

/// Short-range link stack driven by [`BleTask`].
pub trait LinkEngine: Send + 'static {
    /// Run the stack's pending handlers once.
    fn dispatch(&mut self);

    /// Start advertising the firmware-update service.
    fn start_advertising(&mut self);

    /// Stop advertising.
    fn stop_advertising(&mut self);

    /// Whether a central is connected.
    fn is_connected(&self) -> bool;
}

/// The BLE task body.
pub struct BleTask<L> {
    link: SharedEngine<L>,
    signal: WorkPendingSignal,
}

impl<L: LinkEngine> BleTask<L> {
    /// Create a task around a shared link stack.
    pub fn new(link: SharedEngine<L>, signal: WorkPendingSignal) -> Self {
        Self { link, signal }
    }

    /// Dispatch once and report whether to yield.
    pub fn run_once(&mut self) -> Step {
        self.link.with(|link| link.dispatch());

        if self.signal.take() {
            Step::Continue
        } else {
            Step::Yield
        }
    }

    /// Run forever.
    pub async fn run(mut self) {
        tracing::info!("BLE task started");

        self.link.with(|link| link.start_advertising());

        loop {
            if self.run_once() == Step::Yield {
                tokio::task::yield_now().await;
            }
        }
    }
}
