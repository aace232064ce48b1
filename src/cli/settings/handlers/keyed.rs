//! Handlers for settings that take a key before the value.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;
use crate::core::generation::{check_option_key, parse_option_value};
use crate::models::find_model;

/// Handler for `served-model <model-id> <served-name>`.
pub struct ServedModelHandler;

impl SettingHandler for ServedModelHandler {
    fn key(&self) -> &'static str {
        "served-model"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.len() < 2 {
            return Err(SettingError::MissingArgs {
                hint: "To change the name a model is served under, give the model id and the name:",
                example: "qllama set served-model mistral mistral-7b-instruct",
            });
        }

        let entry = find_model(&args[0]).ok_or_else(|| SettingError::UnknownModel {
            input: args[0].clone(),
        })?;
        let served = args[1..].join(" ");
        config.set_served_model(entry.id, served.clone());

        Ok(format!(
            "✅ Set served-model for '{}' to: {served}",
            entry.id
        ))
    }

    fn unset(&self, arg: Option<&str>, config: &mut Config) -> Result<String, SettingError> {
        let input = arg.ok_or(SettingError::MissingArgs {
            hint: "To restore the built-in served name, specify the model id:",
            example: "qllama unset served-model mistral",
        })?;
        let entry = find_model(input).ok_or_else(|| SettingError::UnknownModel {
            input: input.to_string(),
        })?;
        config.unset_served_model(entry.id);

        Ok(format!(
            "✅ Unset served-model for '{}' (will use: {})",
            entry.id, entry.served_model
        ))
    }
}

/// Handler for `option <key> <value>`, extra request fields sent with every
/// generation.
pub struct OptionHandler;

impl SettingHandler for OptionHandler {
    fn key(&self) -> &'static str {
        "option"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.len() < 2 {
            return Err(SettingError::MissingArgs {
                hint: "To add a generation option, give its name and value:",
                example: "qllama set option repetition_penalty 1.1",
            });
        }

        let key = args[0].trim();
        check_option_key(key).map_err(|_| SettingError::InvalidValue {
            key: "option",
            input: key.to_string(),
            expected: "a name not covered by its own setting",
        })?;
        let value = parse_option_value(&args[1..].join(" "));
        let message = format!("✅ Set option {key} to: {value}");
        config.set_option(key.to_string(), value);

        Ok(message)
    }

    fn unset(&self, arg: Option<&str>, config: &mut Config) -> Result<String, SettingError> {
        let key = arg.ok_or(SettingError::MissingArgs {
            hint: "To remove a generation option, specify its name:",
            example: "qllama unset option repetition_penalty",
        })?;

        if config.unset_option(key) {
            Ok(format!("✅ Unset option {key}"))
        } else {
            Ok(format!("ℹ️  Option {key} was not set"))
        }
    }
}
