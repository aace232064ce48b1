//! Helper functions for settings operations.

use crate::core::config::data::Config;

use super::error::SettingError;

/// Runs `edit` against the current config and saves the result only when it
/// succeeds. Validation errors come back unchanged; load and save failures
/// become `SettingError::ConfigError`.
pub fn mutate_config<F, T>(edit: F) -> Result<T, SettingError>
where
    F: FnOnce(&mut Config) -> Result<T, SettingError>,
{
    Config::mutate(|config| {
        edit(config).map_err(|err| -> Box<dyn std::error::Error> { Box::new(err) })
    })
    .map_err(|err| match err.downcast::<SettingError>() {
        Ok(setting_error) => *setting_error,
        Err(other) => SettingError::ConfigError(other.to_string()),
    })
}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str) -> String {
    format!("✅ Unset {key}")
}

/// Truncate a string to `max_chars` characters, appending "..." if truncated.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}
