//! Handlers for numeric generation and client settings.

use std::fmt::Display;
use std::str::FromStr;

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::success_set;
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;

/// Data-driven handler for a number with a validity check.
pub struct NumericHandler<T> {
    key: &'static str,
    example: &'static str,
    expected: &'static str,
    default_display: String,
    accept: fn(T) -> bool,
    set_field: fn(&mut Config, Option<T>),
}

impl<T> SettingHandler for NumericHandler<T>
where
    T: FromStr + Display + Copy + Send + Sync,
{
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let [input] = args else {
            return Err(SettingError::MissingArgs {
                hint: "Specify exactly one number:",
                example: self.example,
            });
        };

        let invalid = || SettingError::InvalidValue {
            key: self.key,
            input: input.clone(),
            expected: self.expected,
        };
        let value: T = input.trim().parse().map_err(|_| invalid())?;
        if !(self.accept)(value) {
            return Err(invalid());
        }

        (self.set_field)(config, Some(value));
        Ok(success_set(self.key, &value.to_string()))
    }

    fn unset(&self, _arg: Option<&str>, config: &mut Config) -> Result<String, SettingError> {
        (self.set_field)(config, None);
        Ok(format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default_display
        ))
    }
}

/// Create a handler for the `temperature` setting.
pub fn temperature_handler() -> NumericHandler<f32> {
    NumericHandler {
        key: "temperature",
        example: "qllama set temperature 0.7",
        expected: "a number greater than 0",
        default_display: crate::core::generation::DEFAULT_TEMPERATURE.to_string(),
        accept: |v| v.is_finite() && v > 0.0,
        set_field: |c, v| c.temperature = v,
    }
}

/// Create a handler for the `top-p` setting.
pub fn top_p_handler() -> NumericHandler<f32> {
    NumericHandler {
        key: "top-p",
        example: "qllama set top-p 0.9",
        expected: "a number in (0, 1]",
        default_display: crate::core::generation::DEFAULT_TOP_P.to_string(),
        accept: |v| v > 0.0 && v <= 1.0,
        set_field: |c, v| c.top_p = v,
    }
}

/// Create a handler for the `max-tokens` setting.
pub fn max_tokens_handler() -> NumericHandler<u32> {
    NumericHandler {
        key: "max-tokens",
        example: "qllama set max-tokens 256",
        expected: "a whole number greater than 0",
        default_display: crate::core::generation::DEFAULT_MAX_TOKENS.to_string(),
        accept: |v| v > 0,
        set_field: |c, v| c.max_tokens = v,
    }
}

/// Create a handler for the `request-timeout` setting, in seconds.
pub fn request_timeout_handler() -> NumericHandler<u64> {
    NumericHandler {
        key: "request-timeout",
        example: "qllama set request-timeout 600",
        expected: "a whole number of seconds greater than 0",
        default_display: format!(
            "{}s",
            crate::core::config::defaults::DEFAULT_REQUEST_TIMEOUT_SECS
        ),
        accept: |v| v > 0,
        set_field: |c, v| c.request_timeout_secs = v,
    }
}
