//! Error types for radiowire.

use thiserror::Error;

/// Main error type for all radiowire operations.
#[derive(Debug, Error)]
pub enum RadiowireError {
    /// Malformed or missing command arguments.
    ///
    /// Rendered on the console as `error: <message>`; never changes state.
    #[error("{0}")]
    Usage(String),

    /// Incomplete or invalid escape sequence in a payload.
    #[error("malformed escape at offset {offset}: {reason}")]
    MalformedEscape {
        /// Byte offset of the introducing backslash.
        offset: usize,
        /// What was wrong with the sequence.
        reason: &'static str,
    },

    /// Bounded-wait enqueue expired (or `try_send` on a full queue).
    #[error("queue full")]
    QueueFull,

    /// The consuming task has gone away.
    #[error("queue closed")]
    QueueClosed,

    /// I/O error on the console streams or config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value out of range.
    #[error("config error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl RadiowireError {
    /// Shorthand for a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Result type alias using RadiowireError.
pub type Result<T> = std::result::Result<T, RadiowireError>;
