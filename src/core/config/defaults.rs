use serde_json::Value;
use std::time::Duration;

use crate::core::config::data::{Config, ModelOverride};
use crate::core::generation::{GenerationConfig, GenerationConfigError};
use crate::models::registry::normalize_model_id;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

impl Config {
    /// Built-in generation defaults overlaid with the values in this file.
    pub fn generation_defaults(&self) -> Result<GenerationConfig, GenerationConfigError> {
        let mut defaults = GenerationConfig::default();
        if let Some(device) = &self.device {
            defaults.device = device.clone();
        }
        if let Some(temperature) = self.temperature {
            defaults.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            defaults.max_tokens = max_tokens;
        }
        if let Some(top_p) = self.top_p {
            defaults.top_p = top_p;
        }
        if let Some(do_sample) = self.do_sample {
            defaults.do_sample = do_sample;
        }
        defaults.options = self.options.clone();
        defaults.validate()?;
        Ok(defaults)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Reads the bearer token from the variable named by `api_key_env`.
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref()?;
        std::env::var(var).ok().filter(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
    }

    pub fn served_model_override(&self, model_id: &str) -> Option<&str> {
        self.models
            .get(&normalize_model_id(model_id))
            .and_then(|entry| entry.served_model.as_deref())
    }

    pub fn set_served_model(&mut self, model_id: &str, served_model: String) {
        self.models
            .entry(normalize_model_id(model_id))
            .or_insert_with(ModelOverride::default)
            .served_model = Some(served_model);
    }

    pub fn unset_served_model(&mut self, model_id: &str) {
        let key = normalize_model_id(model_id);
        if let Some(entry) = self.models.get_mut(&key) {
            entry.served_model = None;
            if *entry == ModelOverride::default() {
                self.models.remove(&key);
            }
        }
    }

    pub fn set_option(&mut self, key: String, value: Value) {
        self.options.insert(key, value);
    }

    pub fn unset_option(&mut self, key: &str) -> bool {
        self.options.remove(key).is_some()
    }
}
