//! Generation parameters.
//!
//! A [`GenerationConfig`] holds the process-wide defaults, built once at
//! startup from built-ins, the config file and `run` flags. Each turn gets a
//! fresh effective config from [`GenerationConfig::merged`]; the defaults
//! themselves are never changed by a turn.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::backend::validate_device;

pub const DEFAULT_DEVICE: &str = "cuda";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 64;
pub const DEFAULT_TOP_P: f32 = 1.0;

/// Request fields owned by the chat payload; extra options may not shadow them.
const RESERVED_OPTIONS: &[&str] = &[
    "model",
    "messages",
    "stream",
    "max_tokens",
    "temperature",
    "top_p",
    "device",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub device: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub do_sample: bool,
    /// Extra named options passed through to the backend untouched.
    pub options: BTreeMap<String, Value>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            do_sample: true,
            options: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    /// Returns a new config with `overrides` applied on top of `self`.
    pub fn merged(&self, overrides: &GenerationOverrides) -> Result<Self, GenerationConfigError> {
        let mut effective = self.clone();
        if let Some(device) = &overrides.device {
            effective.device = device.clone();
        }
        if let Some(temperature) = overrides.temperature {
            effective.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            effective.max_tokens = max_tokens;
        }
        if let Some(top_p) = overrides.top_p {
            effective.top_p = top_p;
        }
        if let Some(do_sample) = overrides.do_sample {
            effective.do_sample = do_sample;
        }
        for (key, value) in &overrides.options {
            effective.options.insert(key.clone(), value.clone());
        }
        effective.validate()?;
        Ok(effective)
    }

    pub fn validate(&self) -> Result<(), GenerationConfigError> {
        if self.device.trim().is_empty() {
            return Err(GenerationConfigError::EmptyDevice);
        }
        if validate_device(&self.device).is_err() {
            return Err(GenerationConfigError::InvalidValue {
                flag: "device".to_string(),
                value: self.device.clone(),
            });
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(GenerationConfigError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(GenerationConfigError::InvalidMaxTokens);
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(GenerationConfigError::InvalidTopP(self.top_p));
        }
        for key in self.options.keys() {
            check_option_key(key)?;
        }
        Ok(())
    }

    /// Sampling temperature to send; greedy decoding is expressed as 0.
    pub fn effective_temperature(&self) -> f32 {
        if self.do_sample {
            self.temperature
        } else {
            0.0
        }
    }
}

/// A partial [`GenerationConfig`]; unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOverrides {
    pub device: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub do_sample: Option<bool>,
    pub options: BTreeMap<String, Value>,
}

impl GenerationOverrides {
    pub fn is_empty(&self) -> bool {
        self == &GenerationOverrides::default()
    }

    /// `Some(true)` for flags that take a value, `Some(false)` for switches,
    /// `None` for names that are not generation flags. Names omit the `--`.
    pub fn flag_takes_value(name: &str) -> Option<bool> {
        match name {
            "device" | "temperature" | "max-tokens" | "top-p" | "option" => Some(true),
            "sample" | "no-sample" => Some(false),
            _ => None,
        }
    }

    /// Applies one command-line style flag (`name` without the `--`).
    pub fn apply_flag(
        &mut self,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), GenerationConfigError> {
        let takes_value = Self::flag_takes_value(name)
            .ok_or_else(|| GenerationConfigError::UnknownFlag(name.to_string()))?;
        let value = match (takes_value, value) {
            (true, Some(value)) => value,
            (true, None) => {
                return Err(GenerationConfigError::MissingValue {
                    flag: name.to_string(),
                })
            }
            (false, Some(value)) => {
                return Err(GenerationConfigError::InvalidValue {
                    flag: name.to_string(),
                    value: value.to_string(),
                })
            }
            (false, None) => "",
        };

        match name {
            "device" => self.device = Some(value.to_string()),
            "temperature" => self.temperature = Some(parse_number(name, value)?),
            "max-tokens" => self.max_tokens = Some(parse_number(name, value)?),
            "top-p" => self.top_p = Some(parse_number(name, value)?),
            "option" => {
                let (key, value) = parse_option(value)?;
                self.options.insert(key, value);
            }
            "sample" => self.do_sample = Some(true),
            "no-sample" => self.do_sample = Some(false),
            _ => return Err(GenerationConfigError::UnknownFlag(name.to_string())),
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, GenerationConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| GenerationConfigError::InvalidValue {
            flag: flag.to_string(),
            value: value.to_string(),
        })
}

/// Parses `key=value`. Values that read as JSON (numbers, booleans, arrays)
/// keep that type; anything else is a string.
pub fn parse_option(spec: &str) -> Result<(String, Value), GenerationConfigError> {
    let (key, raw) = spec
        .split_once('=')
        .ok_or_else(|| GenerationConfigError::InvalidOption(spec.to_string()))?;
    let key = key.trim();
    check_option_key(key)?;
    Ok((key.to_string(), parse_option_value(raw)))
}

pub fn parse_option_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn check_option_key(key: &str) -> Result<(), GenerationConfigError> {
    if key.is_empty() {
        return Err(GenerationConfigError::InvalidOption(key.to_string()));
    }
    if RESERVED_OPTIONS.contains(&key) {
        return Err(GenerationConfigError::ReservedOption(key.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationConfigError {
    EmptyDevice,
    InvalidTemperature(f32),
    InvalidMaxTokens,
    InvalidTopP(f32),
    UnknownFlag(String),
    MissingValue { flag: String },
    InvalidValue { flag: String, value: String },
    InvalidOption(String),
    ReservedOption(String),
}

impl fmt::Display for GenerationConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationConfigError::EmptyDevice => write!(f, "device must not be empty"),
            GenerationConfigError::InvalidTemperature(value) => {
                write!(f, "temperature must be greater than 0 (got {value})")
            }
            GenerationConfigError::InvalidMaxTokens => {
                write!(f, "max-tokens must be greater than 0")
            }
            GenerationConfigError::InvalidTopP(value) => {
                write!(f, "top-p must be in (0, 1] (got {value})")
            }
            GenerationConfigError::UnknownFlag(flag) => write!(f, "unknown flag --{flag}"),
            GenerationConfigError::MissingValue { flag } => {
                write!(f, "--{flag} needs a value")
            }
            GenerationConfigError::InvalidValue { flag, value } => {
                write!(f, "invalid value for --{flag}: {value:?}")
            }
            GenerationConfigError::InvalidOption(spec) => {
                write!(f, "options must look like key=value (got {spec:?})")
            }
            GenerationConfigError::ReservedOption(key) => {
                write!(f, "option {key:?} is set by its own flag")
            }
        }
    }
}

impl std::error::Error for GenerationConfigError {}
