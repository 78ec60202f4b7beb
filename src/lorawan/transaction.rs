//! Units of work queued for the LoRaWAN run loop.

use bytes::Bytes;

/// Largest application payload the stack accepts, in bytes.
pub const MAX_APP_PAYLOAD: usize = 242;

/// Application port used when a command does not name one.
pub const DEFAULT_APP_PORT: u8 = 2;

/// Highest port available to applications; 224 and up are reserved.
pub const MAX_APP_PORT: u8 = 223;

/// Discrete, parameterless instruction for the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Start the network join procedure.
    Join,
}

/// Delivery mode of an uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    /// Fire and forget.
    #[default]
    Unconfirmed,
    /// Ask the network server to acknowledge.
    Confirmed,
}

impl AckMode {
    /// Map a numeric console flag: zero is unconfirmed, anything else confirmed.
    pub fn from_flag(flag: i64) -> Self {
        if flag != 0 {
            AckMode::Confirmed
        } else {
            AckMode::Unconfirmed
        }
    }

    /// Whether the network server should acknowledge.
    #[inline]
    pub fn is_confirmed(self) -> bool {
        self == AckMode::Confirmed
    }
}

/// One pending outbound application payload.
///
/// The payload never exceeds the maximum it was built with; longer input is
/// cut to exactly that length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    ack: AckMode,
    port: u8,
    payload: Bytes,
}

impl Transaction {
    /// Build a transaction capped at [`MAX_APP_PAYLOAD`].
    pub fn new(ack: AckMode, port: u8, payload: impl Into<Bytes>) -> Self {
        Self::with_max_payload(ack, port, payload, MAX_APP_PAYLOAD)
    }

    /// Build a transaction capped at `max_payload` bytes.
    pub fn with_max_payload(
        ack: AckMode,
        port: u8,
        payload: impl Into<Bytes>,
        max_payload: usize,
    ) -> Self {
        let mut payload = payload.into();
        if payload.len() > max_payload {
            tracing::warn!(
                "Payload of {} bytes truncated to {} bytes",
                payload.len(),
                max_payload
            );
            payload.truncate(max_payload);
        }
        Self { ack, port, payload }
    }

    /// Delivery mode.
    #[inline]
    pub fn ack(&self) -> AckMode {
        self.ack
    }

    /// Application port.
    #[inline]
    pub fn port(&self) -> u8 {
        self.port
    }

    /// Payload bytes.
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty (a bare uplink).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
