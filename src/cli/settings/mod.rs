//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a handler; handlers differ by the shape of the
//! value they edit:
//!
//! - Text settings (e.g., `endpoint`, `device`, `system-prompt`)
//! - Numeric settings (e.g., `temperature`, `max-tokens`)
//! - Boolean settings (e.g., `do-sample`)
//! - Keyed settings (`served-model <id> <name>`, `option <key> <value>`)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use std::io::Write;

use crate::core::config::data::Config;
use helpers::mutate_config;

/// Trait for handling a configuration setting.
///
/// Handlers validate their input and edit a working copy of the config; the
/// caller persists the copy only when the handler succeeds.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the arguments after the key. Returns the message
    /// to display.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Clear the value. `arg` selects an entry for keyed settings.
    fn unset(&self, arg: Option<&str>, config: &mut Config) -> Result<String, SettingError>;
}

/// `qllama set <key> <value...>`. With no value, prints the configuration.
pub fn run_set<W: Write>(
    registry: &SettingRegistry,
    key: &str,
    args: &[String],
    out: &mut W,
) -> Result<(), SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;

    if args.is_empty() {
        return print_config(out);
    }

    let message = mutate_config(|config| handler.set(args, config))?;
    writeln!(out, "{message}").map_err(SettingError::Output)
}

/// `qllama unset <key> [arg]`.
pub fn run_unset<W: Write>(
    registry: &SettingRegistry,
    key: &str,
    arg: Option<&str>,
    out: &mut W,
) -> Result<(), SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;

    let message = mutate_config(|config| handler.unset(arg, config))?;
    writeln!(out, "{message}").map_err(SettingError::Output)
}

/// `qllama config`.
pub fn print_config<W: Write>(out: &mut W) -> Result<(), SettingError> {
    let config = Config::load().map_err(|e| SettingError::ConfigError(e.to_string()))?;
    config
        .print_all(out, &Config::active_path())
        .map_err(SettingError::Output)
}
