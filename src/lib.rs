//! # radiowire
//!
//! Task-level orchestration for a node carrying a LoRaWAN radio and a BLE
//! link.
//!
//! ## Architecture
//!
//! - **LoRaWAN task**: a cooperative [`RunLoop`](lorawan::RunLoop) that pulls
//!   control events and uplinks from two bounded queues, gates uplinks on
//!   the engine being idle, and advances the engine every iteration
//! - **BLE task**: keeps the link stack's dispatcher running
//! - **Console**: line commands (`lorawan send ...`) that enqueue work
//!
//! Each radio task yields when its [`WorkPendingSignal`] is clear and spins
//! again immediately when an interrupt raised it.
//!
//! ## Example
//!
//! ```no_run
//! use radiowire::ble::sim::SimulatedLink;
//! use radiowire::engine::sim::SimulatedMac;
//! use radiowire::{Firmware, WorkPendingSignal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mac_irq = WorkPendingSignal::new();
//!     let ble_irq = WorkPendingSignal::new();
//!
//!     let firmware = Firmware::builder()
//!         .lorawan(SimulatedMac::new(mac_irq.clone()), mac_irq)
//!         .ble(SimulatedLink::new(ble_irq.clone()), ble_irq)
//!         .start(tokio::io::BufReader::new(tokio::io::stdin()), tokio::io::stdout())
//!         .await?;
//!
//!     firmware.wait_for_console().await?;
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod codec;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod logging;
pub mod lorawan;
pub mod queue;
pub mod signal;

mod firmware;

pub use codec::HexEscapeCodec;
pub use config::Config;
pub use error::RadiowireError;
pub use firmware::{Firmware, FirmwareBuilder};
pub use lorawan::{LorawanHandle, Transaction};
pub use signal::WorkPendingSignal;
