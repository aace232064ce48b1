//! Handlers for settings holding a single string.

use crate::backend::validate_device;
use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{success_set, success_unset, truncate_with_ellipsis};
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;
use crate::core::config::defaults::DEFAULT_ENDPOINT;
use crate::core::generation::DEFAULT_DEVICE;
use crate::utils::url::{is_http_endpoint, normalize_base_url};

/// Data-driven handler for free-text settings with an optional check.
pub struct TextSettingHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: Option<&'static str>,
    validate: fn(&str) -> Result<String, SettingError>,
    set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for TextSettingHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let value = (self.validate)(input.trim())?;
        let display = truncate_with_ellipsis(&value.replace('\n', " "), 50);
        (self.set_field)(config, Some(value));
        Ok(success_set(self.key, &display))
    }

    fn unset(&self, _arg: Option<&str>, config: &mut Config) -> Result<String, SettingError> {
        (self.set_field)(config, None);
        Ok(match self.default_display {
            Some(default) => format!("✅ Unset {} (will use default: {default})", self.key),
            None => success_unset(self.key),
        })
    }
}

fn accept_any(input: &str) -> Result<String, SettingError> {
    Ok(input.to_string())
}

fn check_endpoint(input: &str) -> Result<String, SettingError> {
    if is_http_endpoint(input) {
        Ok(normalize_base_url(input))
    } else {
        Err(SettingError::InvalidValue {
            key: "endpoint",
            input: input.to_string(),
            expected: "an http:// or https:// URL",
        })
    }
}

fn check_device(input: &str) -> Result<String, SettingError> {
    validate_device(input).map_err(|_| SettingError::InvalidValue {
        key: "device",
        input: input.to_string(),
        expected: "cpu, cuda, cuda:N, mps or auto",
    })?;
    Ok(input.to_ascii_lowercase())
}

fn check_env_name(input: &str) -> Result<String, SettingError> {
    let valid = input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(input.to_string())
    } else {
        Err(SettingError::InvalidValue {
            key: "api-key-env",
            input: input.to_string(),
            expected: "an environment variable name such as VLLM_API_KEY",
        })
    }
}

/// Create a handler for the `endpoint` setting.
pub fn endpoint_handler() -> TextSettingHandler {
    TextSettingHandler {
        key: "endpoint",
        hint: "To set the inference server, give its base URL:",
        example: "qllama set endpoint http://localhost:8000/v1",
        default_display: Some(DEFAULT_ENDPOINT),
        validate: check_endpoint,
        set_field: |c, v| c.endpoint = v,
    }
}

/// Create a handler for the `api-key-env` setting.
pub fn api_key_env_handler() -> TextSettingHandler {
    TextSettingHandler {
        key: "api-key-env",
        hint: "To send a bearer token, name the environment variable holding it:",
        example: "qllama set api-key-env VLLM_API_KEY",
        default_display: None,
        validate: check_env_name,
        set_field: |c, v| c.api_key_env = v,
    }
}

/// Create a handler for the `device` setting.
pub fn device_handler() -> TextSettingHandler {
    TextSettingHandler {
        key: "device",
        hint: "To set the default device, specify one of cpu, cuda, cuda:N, mps, auto:",
        example: "qllama set device cuda:1",
        default_display: Some(DEFAULT_DEVICE),
        validate: check_device,
        set_field: |c, v| c.device = v,
    }
}

/// Create a handler for the `system-prompt` setting.
pub fn system_prompt_handler() -> TextSettingHandler {
    TextSettingHandler {
        key: "system-prompt",
        hint: "To set a system prompt, provide the prompt text:",
        example: "qllama set system-prompt \"Answer in one sentence.\"",
        default_display: None,
        validate: accept_any,
        set_field: |c, v| c.system_prompt = v,
    }
}
