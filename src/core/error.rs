use std::error::Error as StdError;
use std::fmt;

use crate::backend::BackendError;
use crate::core::conversation::HistoryError;
use crate::core::generation::GenerationConfigError;

/// Everything that can go wrong between reading a line and printing a reply.
#[derive(Debug)]
pub enum ChatError {
    /// The input resolved to no content parts (blank line).
    EmptyMessage,

    /// The registry has no handler for the requested model id.
    UnknownModel { id: String, known: Vec<String> },

    /// The backend could not provide the model.
    ModelLoad { model: String, source: BackendError },

    /// A handler or session was used before `load_model` succeeded.
    NotLoaded { model: String },

    /// `load_model` was called on a handler that is already loaded.
    AlreadyLoaded { model: String },

    /// The backend failed while producing a reply.
    Generation { model: String, source: BackendError },

    /// The effective generation parameters were rejected.
    InvalidParameters(GenerationConfigError),

    /// A message would have broken the conversation ordering.
    History(HistoryError),
}

impl ChatError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ChatError::UnknownModel { .. } => 2,
            _ => 1,
        }
    }

    /// Whether the failure happened after the user turn was recorded.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, ChatError::Generation { .. })
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::EmptyMessage => write!(f, "Nothing to send: the message has no content"),
            ChatError::UnknownModel { id, known } => {
                write!(f, "Unknown model: {id}")?;
                if !known.is_empty() {
                    write!(f, ". Available models: {}", known.join(", "))?;
                }
                Ok(())
            }
            ChatError::ModelLoad { model, source } => {
                write!(f, "Failed to load {model}: {source}")
            }
            ChatError::NotLoaded { model } => {
                write!(f, "Model {model} is not loaded yet")
            }
            ChatError::AlreadyLoaded { model } => {
                write!(f, "Model {model} is already loaded")
            }
            ChatError::Generation { model, source } => {
                write!(f, "Generation with {model} failed: {source}")
            }
            ChatError::InvalidParameters(err) => write!(f, "Invalid generation parameters: {err}"),
            ChatError::History(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for ChatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatError::ModelLoad { source, .. } | ChatError::Generation { source, .. } => {
                Some(source)
            }
            ChatError::InvalidParameters(err) => Some(err),
            ChatError::History(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GenerationConfigError> for ChatError {
    fn from(err: GenerationConfigError) -> Self {
        ChatError::InvalidParameters(err)
    }
}

impl From<HistoryError> for ChatError {
    fn from(err: HistoryError) -> Self {
        ChatError::History(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_lists_known_ids() {
        let err = ChatError::UnknownModel {
            id: "llama9".to_string(),
            known: vec!["smolvlm2".to_string(), "mistral".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown model: llama9. Available models: smolvlm2, mistral"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn wrapped_backend_errors_are_sources() {
        let err = ChatError::ModelLoad {
            model: "mistral".to_string(),
            source: BackendError::UnsupportedDevice("tpu".to_string()),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("tpu"));
        assert_eq!(err.exit_code(), 1);
    }
}
