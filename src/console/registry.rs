//! Command registry for dispatching console lines by command name.
//!
//! A line is split on whitespace; the first word selects the command and
//! the remaining words are its arguments. The built-in `help` command lists
//! the summary of every registered command.
//!
//! # Example
//!
//! ```
//! use radiowire::console::{BoxFuture, Command, CommandRegistry, CommandResult};
//!
//! struct Version;
//!
//! impl Command for Version {
//!     fn summary(&self) -> &str {
//!         "version:\tPrint the firmware version."
//!     }
//!
//!     fn execute<'a>(&'a self, _args: &'a [&'a str]) -> BoxFuture<'a, CommandResult> {
//!         Box::pin(async { Ok("0.1.0".to_string()) })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> radiowire::error::Result<()> {
//! let mut registry = CommandRegistry::new();
//! registry.register("version", Version);
//!
//! assert_eq!(registry.dispatch("version").await?, "0.1.0");
//! assert!(registry.dispatch("help").await?.contains("version:"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::{RadiowireError, Result};

/// Result type for command execution: text to print, or an error.
pub type CommandResult = Result<String>;

/// Boxed future for command results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A console command.
pub trait Command: Send + Sync + 'static {
    /// One-line description listed by the top-level `help`.
    fn summary(&self) -> &str;

    /// Execute with the words following the command name.
    fn execute<'a>(&'a self, args: &'a [&'a str]) -> BoxFuture<'a, CommandResult>;
}

/// Registry mapping command names to commands.
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Register a command under `name`, replacing any previous one.
    pub fn register<C: Command>(&mut self, name: &str, command: C) {
        if self
            .commands
            .insert(name.to_string(), Box::new(command))
            .is_some()
        {
            tracing::warn!("Console command '{}' registered twice", name);
        }
    }

    /// Check whether a command exists.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Names of all registered commands, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(|s| s.as_str())
    }

    /// Text of the built-in `help` command.
    pub fn help_text(&self) -> String {
        let mut out = String::from("help:\n Lists all the registered commands\n\n");
        for command in self.commands.values() {
            out.push_str(command.summary());
            out.push('\n');
        }
        out
    }

    /// Dispatch one console line.
    ///
    /// Blank lines produce no output.
    pub async fn dispatch(&self, line: &str) -> CommandResult {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = words.split_first() else {
            return Ok(String::new());
        };

        if *name == "help" {
            return Ok(self.help_text());
        }

        let command = self.commands.get(*name).ok_or_else(|| {
            RadiowireError::usage(format!(
                "command '{}' not recognised, enter 'help' to view a list of available commands",
                name
            ))
        })?;

        command.execute(args).await
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a possibly abbreviated subcommand.
///
/// `word` matches the first name in `names` it is a prefix of, so earlier
/// names win ties (`s` picks `send` only if no earlier name starts with `s`).
pub fn match_prefix(word: &str, names: &[&'static str]) -> Option<&'static str> {
    if word.is_empty() {
        return None;
    }
    names.iter().copied().find(|name| name.starts_with(word))
}
