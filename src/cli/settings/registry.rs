//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    api_key_env_handler, device_handler, do_sample_handler, endpoint_handler,
    max_tokens_handler, request_timeout_handler, system_prompt_handler, temperature_handler,
    top_p_handler, OptionHandler, ServedModelHandler,
};
use super::SettingHandler;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for help output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(endpoint_handler()));
        registry.register(Box::new(api_key_env_handler()));
        registry.register(Box::new(device_handler()));
        registry.register(Box::new(temperature_handler()));
        registry.register(Box::new(max_tokens_handler()));
        registry.register(Box::new(top_p_handler()));
        registry.register(Box::new(do_sample_handler()));
        registry.register(Box::new(system_prompt_handler()));
        registry.register(Box::new(request_timeout_handler()));
        registry.register(Box::new(ServedModelHandler));
        registry.register(Box::new(OptionHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
