//! Line-command console.
//!
//! - [`CommandRegistry`] - routes a line to a [`Command`] by its first word
//! - [`ConsoleWriter`] - `\r\n`-terminated output and the prompt
//! - [`run_console`] - the console task body
//! - [`LorawanCommand`] / [`AmotaCommand`] - the firmware's commands

pub mod amota;
pub mod lorawan;
pub mod output;
pub mod registry;
pub mod session;

pub use amota::AmotaCommand;
pub use lorawan::LorawanCommand;
pub use output::ConsoleWriter;
pub use registry::{BoxFuture, Command, CommandRegistry, CommandResult};
pub use session::run_console;
