//! Simulated BLE link for host builds.

use super::LinkEngine;
use crate::signal::WorkPendingSignal;

/// Advertises on request and reports a connection once a peer "connects".
#[derive(Debug)]
pub struct SimulatedLink {
    irq: WorkPendingSignal,
    advertising: bool,
    connected: bool,
    /// Set by `connect_peer`, applied on the next dispatch.
    peer_pending: bool,
}

impl SimulatedLink {
    /// Create an idle link.
    pub fn new(irq: WorkPendingSignal) -> Self {
        Self {
            irq,
            advertising: false,
            connected: false,
            peer_pending: false,
        }
    }

    /// Pretend a central connects; takes effect on the next dispatch.
    pub fn connect_peer(&mut self) {
        self.peer_pending = true;
        self.irq.raise();
    }

    /// Pretend the central disconnects.
    pub fn disconnect_peer(&mut self) {
        self.connected = false;
    }

    /// Whether advertising is on.
    pub fn is_advertising(&self) -> bool {
        self.advertising
    }
}

impl LinkEngine for SimulatedLink {
    fn dispatch(&mut self) {
        if self.peer_pending && self.advertising {
            self.peer_pending = false;
            self.advertising = false;
            self.connected = true;
            tracing::info!("BLE peer connected");
        }
    }

    fn start_advertising(&mut self) {
        self.advertising = true;
    }

    fn stop_advertising(&mut self) {
        self.advertising = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
