//! Mapping from model ids to handler constructors.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::backend::InferenceBackend;
use crate::core::error::ChatError;
use crate::models::text::TextHandler;
use crate::models::vision::VisionHandler;
use crate::models::{HandlerSpec, ModelHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Vision,
    Text,
}

impl ModelFamily {
    pub fn label(self) -> &'static str {
        match self {
            ModelFamily::Vision => "vision",
            ModelFamily::Text => "text",
        }
    }

    pub fn modalities(self) -> &'static [&'static str] {
        match self {
            ModelFamily::Vision => &["text", "image", "video"],
            ModelFamily::Text => &["text"],
        }
    }
}

pub type HandlerConstructor = fn(&'static str, HandlerSpec) -> Box<dyn ModelHandler>;

pub struct ModelEntry {
    pub id: &'static str,
    pub family: ModelFamily,
    pub served_model: &'static str,
    pub description: &'static str,
    constructor: HandlerConstructor,
}

impl ModelEntry {
    fn matches_alias(&self, normalized: &str) -> bool {
        let full = normalize_model_id(self.served_model);
        let short = self
            .served_model
            .rsplit('/')
            .next()
            .map(normalize_model_id)
            .unwrap_or_default();
        normalized == full || normalized == short
    }
}

fn vision_handler(id: &'static str, spec: HandlerSpec) -> Box<dyn ModelHandler> {
    Box::new(VisionHandler::new(id, spec))
}

fn text_handler(id: &'static str, spec: HandlerSpec) -> Box<dyn ModelHandler> {
    Box::new(TextHandler::new(id, spec))
}

const MODELS: &[ModelEntry] = &[
    ModelEntry {
        id: "smolvlm2",
        family: ModelFamily::Vision,
        served_model: "HuggingFaceTB/SmolVLM2-2.2B-Instruct",
        description: "Compact vision-language model for images and short videos.",
        constructor: vision_handler,
    },
    ModelEntry {
        id: "mistral",
        family: ModelFamily::Text,
        served_model: "mistralai/Mistral-7B-Instruct-v0.2",
        description: "Instruction-tuned text model.",
        constructor: text_handler,
    },
];

pub fn all_models() -> &'static [ModelEntry] {
    MODELS
}

pub fn known_ids() -> Vec<String> {
    MODELS.iter().map(|entry| entry.id.to_string()).collect()
}

/// Lowercases and strips `-` and `_`, so `SmolVLM-2`, `smol_vlm2` and
/// `smolvlm2` all name the same entry.
pub fn normalize_model_id(id: &str) -> String {
    id.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves a user-supplied id: canonical id first, then served-model
/// aliases, then the longest canonical id the input starts with.
pub fn find_model(id: &str) -> Option<&'static ModelEntry> {
    let normalized = normalize_model_id(id);
    if normalized.is_empty() {
        return None;
    }

    MODELS
        .iter()
        .find(|entry| entry.id == normalized)
        .or_else(|| MODELS.iter().find(|entry| entry.matches_alias(&normalized)))
        .or_else(|| {
            MODELS
                .iter()
                .filter(|entry| normalized.starts_with(entry.id))
                .max_by_key(|entry| entry.id.len())
        })
}

/// Builds handlers bound to one backend and load device.
pub struct ModelRegistry {
    backend: Arc<dyn InferenceBackend>,
    device: String,
    served_overrides: HashMap<String, String>,
}

impl ModelRegistry {
    pub fn new(backend: Arc<dyn InferenceBackend>, device: impl Into<String>) -> Self {
        Self {
            backend,
            device: device.into(),
            served_overrides: HashMap::new(),
        }
    }

    /// Serves registry id `id` under a different backend model name.
    pub fn with_served_model(mut self, id: &str, served_model: impl Into<String>) -> Self {
        self.served_overrides
            .insert(normalize_model_id(id), served_model.into());
        self
    }

    pub fn served_model_for(&self, entry: &ModelEntry) -> String {
        self.served_overrides
            .get(entry.id)
            .cloned()
            .unwrap_or_else(|| entry.served_model.to_string())
    }

    /// Returns a fresh, unloaded handler for `model_id`.
    pub fn get_handler(&self, model_id: &str) -> Result<Box<dyn ModelHandler>, ChatError> {
        let entry = find_model(model_id).ok_or_else(|| ChatError::UnknownModel {
            id: model_id.to_string(),
            known: known_ids(),
        })?;
        debug!(requested = model_id, resolved = entry.id, "resolved model id");

        let spec = HandlerSpec {
            served_model: self.served_model_for(entry),
            device: self.device.clone(),
            backend: Arc::clone(&self.backend),
        };
        Ok((entry.constructor)(entry.id, spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::ScriptedBackend;

    fn registry() -> ModelRegistry {
        ModelRegistry::new(ScriptedBackend::new(), "cpu")
    }

    #[test]
    fn unknown_model_is_rejected_with_known_ids() {
        match registry().get_handler("unknown-model") {
            Err(ChatError::UnknownModel { id, known }) => {
                assert_eq!(id, "unknown-model");
                assert_eq!(known, vec!["smolvlm2".to_string(), "mistral".to_string()]);
            }
            Err(other) => panic!("expected UnknownModel, got {other}"),
            Ok(_) => panic!("expected UnknownModel, got a handler"),
        }
    }

    #[test]
    fn known_model_starts_unloaded() {
        let handler = registry().get_handler("smolvlm2").unwrap();
        assert!(!handler.is_loaded());
        assert_eq!(handler.model_id(), "smolvlm2");
        assert_eq!(handler.family(), ModelFamily::Vision);
    }

    #[test]
    fn id_spellings_normalize() {
        for id in ["smolvlm2", "SmolVLM2", "smol-vlm2", "smol_vlm2", "SmolVLM2-2.2B"] {
            assert_eq!(find_model(id).map(|e| e.id), Some("smolvlm2"), "id={id}");
        }
        for id in ["mistral", "Mistral-7B-Instruct-v0.2", "mistralai/Mistral-7B-Instruct-v0.2"] {
            assert_eq!(find_model(id).map(|e| e.id), Some("mistral"), "id={id}");
        }
        assert!(find_model("").is_none());
        assert!(find_model("llama").is_none());
    }

    #[test]
    fn served_model_can_be_overridden() {
        let registry = registry().with_served_model("Mistral", "mistral-local");
        let handler = registry.get_handler("mistral").unwrap();
        assert_eq!(handler.served_model(), "mistral-local");

        let handler = registry.get_handler("smolvlm2").unwrap();
        assert_eq!(handler.served_model(), "HuggingFaceTB/SmolVLM2-2.2B-Instruct");
    }

    #[test]
    fn each_handler_is_independent() {
        let registry = registry();
        let first = registry.get_handler("mistral").unwrap();
        let second = registry.get_handler("mistral").unwrap();
        assert!(!first.is_loaded());
        assert!(!second.is_loaded());
    }
}
