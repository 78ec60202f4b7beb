//! System assembly: spawn the radio tasks and the console.
//!
//! [`FirmwareBuilder`] collects the configuration and the two radio stacks,
//! then [`start`](FirmwareBuilder::start):
//! 1. Creates the LoRaWAN queues and spawns its run loop
//! 2. Spawns the BLE task (when a link is given and enabled)
//! 3. Registers the console commands and spawns the console task
//!
//! # Example
//!
//! ```
//! use radiowire::ble::sim::SimulatedLink;
//! use radiowire::engine::sim::SimulatedMac;
//! use radiowire::{Config, Firmware, WorkPendingSignal};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> radiowire::error::Result<()> {
//! let config = Config::default();
//! let mac_irq = WorkPendingSignal::new();
//! let ble_irq = WorkPendingSignal::new();
//! let mac = SimulatedMac::with_params(mac_irq.clone(), config.lorawan.engine_params());
//!
//! let firmware = Firmware::builder()
//!     .lorawan(mac, mac_irq)
//!     .ble(SimulatedLink::new(ble_irq.clone()), ble_irq)
//!     .config(config)
//!     .start(&b"lorawan send hello\n"[..], tokio::io::sink())
//!     .await?;
//!
//! assert_eq!(firmware.lorawan().defaults().port, 2);
//! firmware.wait_for_console().await?;
//! # Ok(())
//! # }
//! ```

use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinHandle;

use crate::ble::{BleTask, LinkEngine};
use crate::config::Config;
use crate::console::{run_console, AmotaCommand, CommandRegistry, ConsoleWriter, LorawanCommand};
use crate::engine::{ProtocolEngine, SharedEngine};
use crate::error::{RadiowireError, Result};
use crate::lorawan::{self, LorawanHandle};
use crate::signal::WorkPendingSignal;

/// Builder for a running [`Firmware`].
pub struct FirmwareBuilder<E, L> {
    config: Config,
    lorawan: Option<(E, WorkPendingSignal)>,
    ble: Option<(L, WorkPendingSignal)>,
}

impl<E: ProtocolEngine, L: LinkEngine> FirmwareBuilder<E, L> {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            lorawan: None,
            ble: None,
        }
    }

    /// Use this configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the LoRaWAN engine and the signal its interrupts raise.
    pub fn lorawan(mut self, engine: E, irq: WorkPendingSignal) -> Self {
        self.lorawan = Some((engine, irq));
        self
    }

    /// Set the BLE link and the signal its interrupts raise.
    pub fn ble(mut self, link: L, irq: WorkPendingSignal) -> Self {
        self.ble = Some((link, irq));
        self
    }

    /// Spawn every task and start serving the console.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start<R, W>(self, reader: R, writer: W) -> Result<Firmware<E, L>>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (engine, lorawan_irq) = self
            .lorawan
            .ok_or_else(|| RadiowireError::Config("no LoRaWAN engine configured".into()))?;

        let engine = SharedEngine::new(engine);
        let (handle, run_loop) =
            lorawan::stack(engine, lorawan_irq, self.config.lorawan.stack_config());
        let lorawan_task = tokio::spawn(run_loop.run());

        let mut registry = CommandRegistry::new();
        registry.register("lorawan", LorawanCommand::new(handle.clone()));

        let (ble, ble_task) = match self.ble {
            Some((link, irq)) if self.config.ble.enabled => {
                let link = SharedEngine::new(link);
                registry.register("amota", AmotaCommand::new(link.clone()));
                let task = tokio::spawn(BleTask::new(link.clone(), irq).run());
                (Some(link), Some(task))
            }
            Some(_) => {
                tracing::info!("BLE disabled by configuration");
                (None, None)
            }
            None => (None, None),
        };

        let prompt = self.config.console.prompt;
        let console_task = tokio::spawn(async move {
            let mut writer = ConsoleWriter::new(writer);
            let result = run_console(reader, &mut writer, &registry, &prompt).await;
            if let Err(e) = &result {
                tracing::error!("Console error: {}", e);
            }
            result
        });

        tracing::info!("Firmware started");

        Ok(Firmware {
            lorawan: handle,
            ble,
            console_task,
            _lorawan_task: lorawan_task,
            _ble_task: ble_task,
        })
    }
}

impl<E: ProtocolEngine, L: LinkEngine> Default for FirmwareBuilder<E, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// The running system.
///
/// The radio tasks run until the runtime shuts down; the console task ends
/// when its input reaches EOF.
pub struct Firmware<E, L> {
    lorawan: LorawanHandle<E>,
    ble: Option<SharedEngine<L>>,
    console_task: JoinHandle<Result<()>>,
    _lorawan_task: JoinHandle<()>,
    _ble_task: Option<JoinHandle<()>>,
}

impl<E: ProtocolEngine, L: LinkEngine> Firmware<E, L> {
    /// Create a new firmware builder.
    pub fn builder() -> FirmwareBuilder<E, L> {
        FirmwareBuilder::new()
    }

    /// Handle of the LoRaWAN stack.
    pub fn lorawan(&self) -> &LorawanHandle<E> {
        &self.lorawan
    }

    /// The BLE link, if the BLE task is running.
    pub fn ble(&self) -> Option<&SharedEngine<L>> {
        self.ble.as_ref()
    }

    /// Wait until the console input is exhausted.
    pub async fn wait_for_console(self) -> Result<()> {
        self.console_task
            .await
            .map_err(|e| RadiowireError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::sim::SimulatedLink;
    use crate::engine::sim::SimulatedMac;

    fn builder() -> FirmwareBuilder<SimulatedMac, SimulatedLink> {
        let mac_irq = WorkPendingSignal::new();
        let ble_irq = WorkPendingSignal::new();
        Firmware::builder()
            .lorawan(SimulatedMac::new(mac_irq.clone()), mac_irq)
            .ble(SimulatedLink::new(ble_irq.clone()), ble_irq)
    }

    #[tokio::test]
    async fn test_start_requires_lorawan() {
        let result = FirmwareBuilder::<SimulatedMac, SimulatedLink>::new()
            .start(&b""[..], Vec::new())
            .await;
        assert!(matches!(result, Err(RadiowireError::Config(_))));
    }

    #[tokio::test]
    async fn test_console_eof_ends_session() {
        let firmware = builder().start(&b""[..], Vec::new()).await.unwrap();
        assert!(firmware.ble().is_some());
        firmware.wait_for_console().await.unwrap();
    }

    #[tokio::test]
    async fn test_ble_disabled() {
        let mut config = Config::default();
        config.ble.enabled = false;
        let firmware = builder()
            .config(config)
            .start(&b""[..], Vec::new())
            .await
            .unwrap();
        assert!(firmware.ble().is_none());
    }
}
