//! The `lorawan` console command.
//!
//! ```text
//! lorawan help [command]
//! lorawan join
//! lorawan reset
//! lorawan send [[ack] port] <msg>
//! ```
//!
//! `join` and `send` go through the stack's queues; `reset` acts on the MAC
//! directly. Payloads are hex-escape decoded and cut to the stack's maximum
//! payload size before they are queued.

use super::registry::{match_prefix, BoxFuture, Command, CommandResult};
use crate::codec::HexEscapeCodec;
use crate::engine::ProtocolEngine;
use crate::error::{RadiowireError, Result};
use crate::lorawan::{AckMode, LorawanHandle, SendDefaults, Transaction, MAX_APP_PORT};

const SUBCOMMANDS: [&str; 4] = ["help", "join", "reset", "send"];

const USAGE: &str = "\
usage: lorawan [command] [<args>]

Supported commands are:
  join
  reset
  send

See 'lorawan help [command]' for the details of each command.";

const JOIN_HELP: &str = "\
usage: lorawan join

Join a LoRaWAN network.";

const RESET_HELP: &str = "\
usage: lorawan reset

Stop and reset the LoRaMac stack.";

const SEND_HELP: &str = "\
usage: lorawan send [[ack] port] <msg>

Where:
  ack   request a confirmed uplink when non-zero
  port  application port number (1-223)
  msg   payload, \\xHH for raw bytes";

/// Console front end for a LoRaWAN stack.
pub struct LorawanCommand<E> {
    handle: LorawanHandle<E>,
}

impl<E: ProtocolEngine> LorawanCommand<E> {
    /// Wrap a stack handle.
    pub fn new(handle: LorawanHandle<E>) -> Self {
        Self { handle }
    }

    async fn run(&self, args: &[&str]) -> CommandResult {
        let Some((word, rest)) = args.split_first() else {
            return Ok(USAGE.to_string());
        };

        match match_prefix(word, &SUBCOMMANDS) {
            Some("help") => help(rest.first().copied()),
            Some("join") => {
                self.handle.join().await?;
                Ok(String::new())
            }
            Some("reset") => {
                self.handle.reset();
                Ok(String::new())
            }
            Some("send") => {
                let transaction = parse_send(rest, self.handle.defaults())?;
                self.handle.enqueue_transaction(transaction).await?;
                Ok(String::new())
            }
            _ => Err(RadiowireError::usage(format!(
                "unknown lorawan command '{}', see 'lorawan help'",
                word
            ))),
        }
    }
}

impl<E: ProtocolEngine> Command for LorawanCommand<E> {
    fn summary(&self) -> &str {
        "lorawan:\tLoRaWAN Application Framework."
    }

    fn execute<'a>(&'a self, args: &'a [&'a str]) -> BoxFuture<'a, CommandResult> {
        Box::pin(self.run(args))
    }
}

fn help(topic: Option<&str>) -> CommandResult {
    let Some(topic) = topic else {
        return Ok(USAGE.to_string());
    };

    let text = match match_prefix(topic, &SUBCOMMANDS) {
        Some("help") => USAGE,
        Some("join") => JOIN_HELP,
        Some("reset") => RESET_HELP,
        Some("send") => SEND_HELP,
        _ => {
            return Err(RadiowireError::usage(format!(
                "no help for '{}', see 'lorawan help'",
                topic
            )))
        }
    };
    Ok(text.to_string())
}

/// Build a transaction from the arguments of `lorawan send`.
///
/// | args                    | ack          | port         |
/// |-------------------------|--------------|--------------|
/// | `<msg>`                 | default      | default      |
/// | `<port> <msg>`          | default      | given        |
/// | `<ack> <port> <msg>`    | given        | given        |
pub fn parse_send(args: &[&str], defaults: SendDefaults) -> Result<Transaction> {
    let (ack, port, msg) = match args {
        [] => {
            return Err(RadiowireError::usage(
                "missing payload, usage: lorawan send [[ack] port] <msg>",
            ))
        }
        [msg] => (defaults.ack, defaults.port, *msg),
        [port, msg] => (defaults.ack, parse_port(port)?, *msg),
        [ack, port, msg] => (parse_ack(ack)?, parse_port(port)?, *msg),
        _ => {
            return Err(RadiowireError::usage(
                "too many arguments, usage: lorawan send [[ack] port] <msg>",
            ))
        }
    };

    let payload = HexEscapeCodec::decode(msg)?;
    Ok(Transaction::with_max_payload(
        ack,
        port,
        payload,
        defaults.max_payload,
    ))
}

fn parse_port(word: &str) -> Result<u8> {
    match word.parse::<u8>() {
        Ok(port) if (1..=MAX_APP_PORT).contains(&port) => Ok(port),
        _ => Err(RadiowireError::usage(format!(
            "invalid port '{}', expected 1-{}",
            word, MAX_APP_PORT
        ))),
    }
}

fn parse_ack(word: &str) -> Result<AckMode> {
    word.parse::<i64>()
        .map(AckMode::from_flag)
        .map_err(|_| RadiowireError::usage(format!("invalid ack flag '{}'", word)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sim::SimulatedMac;
    use crate::engine::SharedEngine;
    use crate::lorawan::{self, RunLoop, StackConfig, DEFAULT_APP_PORT};
    use crate::signal::WorkPendingSignal;

    fn defaults() -> SendDefaults {
        SendDefaults::default()
    }

    #[test]
    fn test_parse_send_payload_only() {
        let tx = parse_send(&["hello"], defaults()).unwrap();
        assert_eq!(tx.port(), DEFAULT_APP_PORT);
        assert_eq!(tx.ack(), AckMode::Unconfirmed);
        assert_eq!(tx.payload().as_ref(), b"hello");
    }

    #[test]
    fn test_parse_send_with_port() {
        let tx = parse_send(&["10", "hi"], defaults()).unwrap();
        assert_eq!(tx.port(), 10);
        assert_eq!(tx.ack(), AckMode::Unconfirmed);
    }

    #[test]
    fn test_parse_send_with_ack_and_port() {
        let tx = parse_send(&["1", "7", r"\x01\x02"], defaults()).unwrap();
        assert_eq!(tx.ack(), AckMode::Confirmed);
        assert_eq!(tx.port(), 7);
        assert_eq!(tx.payload().as_ref(), &[0x01, 0x02]);

        let tx = parse_send(&["0", "7", "x"], defaults()).unwrap();
        assert_eq!(tx.ack(), AckMode::Unconfirmed);
    }

    #[test]
    fn test_parse_send_respects_defaults() {
        let defaults = SendDefaults {
            port: 42,
            ack: AckMode::Confirmed,
            max_payload: 4,
        };
        let tx = parse_send(&["abcdefgh"], defaults).unwrap();
        assert_eq!(tx.port(), 42);
        assert_eq!(tx.ack(), AckMode::Confirmed);
        assert_eq!(tx.payload().as_ref(), b"abcd");
    }

    #[test]
    fn test_parse_send_arity() {
        assert!(matches!(
            parse_send(&[], defaults()),
            Err(RadiowireError::Usage(_))
        ));
        assert!(matches!(
            parse_send(&["1", "2", "3", "4"], defaults()),
            Err(RadiowireError::Usage(_))
        ));
    }

    #[test]
    fn test_parse_send_bad_port() {
        for port in ["0", "224", "300", "-1", "two"] {
            assert!(
                matches!(
                    parse_send(&[port, "x"], defaults()),
                    Err(RadiowireError::Usage(_))
                ),
                "port {port}"
            );
        }
        assert!(parse_send(&["223", "x"], defaults()).is_ok());
    }

    #[test]
    fn test_parse_send_bad_ack() {
        assert!(matches!(
            parse_send(&["yes", "2", "x"], defaults()),
            Err(RadiowireError::Usage(_))
        ));
    }

    #[test]
    fn test_parse_send_malformed_escape() {
        assert!(matches!(
            parse_send(&[r"ab\x4"], defaults()),
            Err(RadiowireError::MalformedEscape { offset: 2, .. })
        ));
    }

    #[test]
    fn test_help_topics() {
        assert_eq!(help(None).unwrap(), USAGE);
        assert_eq!(help(Some("send")).unwrap(), SEND_HELP);
        assert_eq!(help(Some("j")).unwrap(), JOIN_HELP);
        assert!(help(Some("bogus")).is_err());
    }

    fn command() -> (
        LorawanCommand<SimulatedMac>,
        LorawanHandle<SimulatedMac>,
        RunLoop<SimulatedMac>,
    ) {
        let irq = WorkPendingSignal::new();
        let engine = SharedEngine::new(SimulatedMac::new(irq.clone()));
        let (handle, run_loop) = lorawan::stack(engine, irq, StackConfig::default());
        (LorawanCommand::new(handle.clone()), handle, run_loop)
    }

    #[tokio::test]
    async fn test_send_enqueues() {
        let (cmd, handle, _run_loop) = command();
        assert_eq!(cmd.execute(&["send", "hello"]).await.unwrap(), "");
        assert_eq!(handle.pending_transactions(), 1);
    }

    #[tokio::test]
    async fn test_join_enqueues_control_event() {
        let (cmd, handle, _run_loop) = command();
        cmd.execute(&["join"]).await.unwrap();
        assert_eq!(handle.pending_control_events(), 1);
        assert_eq!(handle.pending_transactions(), 0);
    }

    #[tokio::test]
    async fn test_prefix_subcommand() {
        let (cmd, handle, _run_loop) = command();
        cmd.execute(&["se", "x"]).await.unwrap();
        assert_eq!(handle.pending_transactions(), 1);
    }

    #[tokio::test]
    async fn test_unknown_subcommand_changes_nothing() {
        let (cmd, handle, _run_loop) = command();
        let err = cmd.execute(&["frobnicate"]).await.unwrap_err();
        assert!(matches!(err, RadiowireError::Usage(_)));
        assert_eq!(handle.pending_transactions(), 0);
        assert_eq!(handle.pending_control_events(), 0);
    }

    #[tokio::test]
    async fn test_bad_send_changes_nothing() {
        let (cmd, handle, _run_loop) = command();
        assert!(cmd.execute(&["send", r"\"]).await.is_err());
        assert!(cmd.execute(&["send", "0", "x"]).await.is_err());
        assert_eq!(handle.pending_transactions(), 0);
    }

    #[tokio::test]
    async fn test_no_arguments_prints_usage() {
        let (cmd, _handle, _run_loop) = command();
        assert_eq!(cmd.execute(&[]).await.unwrap(), USAGE);
    }
}
