//! Firmware configuration.
//!
//! Loaded from a TOML file; every key is optional and falls back to the
//! values below. The path comes from `RADIOWIRE_CONFIG` when set.
//!
//! ```toml
//! [lorawan]
//! queue_capacity = 10
//! control_capacity = 10
//! default_port = 2
//! confirmed_by_default = false
//! max_payload = 242
//! # enqueue_timeout_ms = 500
//! region = "US915"
//! adr = true
//! tx_datarate = 3
//! public_network = true
//! max_rx_error_ms = 20
//!
//! [ble]
//! enabled = true
//!
//! [console]
//! prompt = "> "
//!
//! [logging]
//! filter = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::{EngineParams, Region};
use crate::error::{RadiowireError, Result};
use crate::lorawan::{
    AckMode, SendDefaults, StackConfig, DEFAULT_APP_PORT, MAX_APP_PAYLOAD, MAX_APP_PORT,
};
use crate::queue::{EnqueuePolicy, QueueConfig, DEFAULT_QUEUE_CAPACITY};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "RADIOWIRE_CONFIG";

/// Largest payload the radio can carry in one frame.
const MAX_FRAME_PAYLOAD: usize = 255;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// LoRaWAN stack.
    pub lorawan: LorawanConfig,
    /// BLE stack.
    pub ble: BleConfig,
    /// Console.
    pub console: ConsoleConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// `[lorawan]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LorawanConfig {
    pub queue_capacity: usize,
    pub control_capacity: usize,
    pub default_port: u8,
    pub confirmed_by_default: bool,
    pub max_payload: usize,
    /// Wait at most this long for queue room; unset waits forever.
    pub enqueue_timeout_ms: Option<u64>,
    pub region: Region,
    pub adr: bool,
    pub tx_datarate: u8,
    pub public_network: bool,
    pub max_rx_error_ms: u32,
}

impl Default for LorawanConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            control_capacity: DEFAULT_QUEUE_CAPACITY,
            default_port: DEFAULT_APP_PORT,
            confirmed_by_default: false,
            max_payload: MAX_APP_PAYLOAD,
            enqueue_timeout_ms: None,
            region: params.region,
            adr: params.adr,
            tx_datarate: params.tx_datarate,
            public_network: params.public_network,
            max_rx_error_ms: params.max_rx_error_ms,
        }
    }
}

impl LorawanConfig {
    /// Enqueue policy shared by both queues.
    pub fn enqueue_policy(&self) -> EnqueuePolicy {
        match self.enqueue_timeout_ms {
            Some(ms) => EnqueuePolicy::Timeout(Duration::from_millis(ms)),
            None => EnqueuePolicy::Block,
        }
    }

    /// Queue sizes and `send` defaults.
    pub fn stack_config(&self) -> StackConfig {
        let policy = self.enqueue_policy();
        StackConfig {
            transactions: QueueConfig {
                capacity: self.queue_capacity,
                policy,
            },
            control: QueueConfig {
                capacity: self.control_capacity,
                policy,
            },
            defaults: SendDefaults {
                port: self.default_port,
                ack: if self.confirmed_by_default {
                    AckMode::Confirmed
                } else {
                    AckMode::Unconfirmed
                },
                max_payload: self.max_payload,
            },
        }
    }

    /// Engine setup parameters. Duty cycle follows the region.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            region: self.region,
            adr: self.adr,
            tx_datarate: self.tx_datarate,
            public_network: self.public_network,
            duty_cycle: self.region.requires_duty_cycle(),
            max_payload: self.max_payload,
            max_rx_error_ms: self.max_rx_error_ms,
        }
    }
}

/// `[ble]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BleConfig {
    /// Run the BLE task and register the `amota` command.
    pub enabled: bool,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[console]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` overrides it.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `RADIOWIRE_CONFIG`, or use the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let lorawan = &self.lorawan;
        if lorawan.queue_capacity == 0 {
            return Err(RadiowireError::Config(
                "lorawan.queue_capacity must be greater than 0".into(),
            ));
        }
        if lorawan.control_capacity == 0 {
            return Err(RadiowireError::Config(
                "lorawan.control_capacity must be greater than 0".into(),
            ));
        }
        if !(1..=MAX_FRAME_PAYLOAD).contains(&lorawan.max_payload) {
            return Err(RadiowireError::Config(format!(
                "lorawan.max_payload must be between 1 and {}",
                MAX_FRAME_PAYLOAD
            )));
        }
        if !(1..=MAX_APP_PORT).contains(&lorawan.default_port) {
            return Err(RadiowireError::Config(format!(
                "lorawan.default_port must be between 1 and {}",
                MAX_APP_PORT
            )));
        }
        Ok(())
    }
}
