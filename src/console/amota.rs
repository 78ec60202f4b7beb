//! The `amota` console command for the firmware-update link.

use super::registry::{match_prefix, BoxFuture, Command, CommandResult};
use crate::ble::LinkEngine;
use crate::engine::SharedEngine;
use crate::error::RadiowireError;

const SUBCOMMANDS: [&str; 4] = ["help", "start", "stop", "connected"];

const USAGE: &str = "\
usage: amota [command]

Supported commands are:
  start      start advertising
  stop       stop advertising
  connected  report whether a peer is connected";

/// Console front end for the BLE link.
pub struct AmotaCommand<L> {
    link: SharedEngine<L>,
}

impl<L: LinkEngine> AmotaCommand<L> {
    /// Wrap a shared link stack.
    pub fn new(link: SharedEngine<L>) -> Self {
        Self { link }
    }

    fn run(&self, args: &[&str]) -> CommandResult {
        let Some(word) = args.first() else {
            return Ok(USAGE.to_string());
        };

        match match_prefix(word, &SUBCOMMANDS) {
            Some("help") => Ok(USAGE.to_string()),
            Some("start") => {
                self.link.with(|link| link.start_advertising());
                Ok(String::new())
            }
            Some("stop") => {
                self.link.with(|link| link.stop_advertising());
                Ok(String::new())
            }
            Some("connected") => {
                let text = if self.link.lock().is_connected() {
                    "AMOTA: connected"
                } else {
                    "AMOTA: not connected"
                };
                Ok(text.to_string())
            }
            _ => Err(RadiowireError::usage(format!(
                "unknown amota command '{}', see 'amota help'",
                word
            ))),
        }
    }
}

impl<L: LinkEngine> Command for AmotaCommand<L> {
    fn summary(&self) -> &str {
        "amota:\tAMOTA firmware update link."
    }

    fn execute<'a>(&'a self, args: &'a [&'a str]) -> BoxFuture<'a, CommandResult> {
        let result = self.run(args);
        Box::pin(async move { result })
    }
}
