//! Model handlers.
//!
//! A handler adapts one model family to the uniform
//! [`ModelHandler`] capability set: `load_model` and `generate`. Families
//! differ only in how a [`ConversationHistory`] is flattened for the backend;
//! loading, state tracking and the backend call live in [`HandlerCore`].

pub mod encode;
pub mod registry;
pub mod text;
pub mod vision;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{ChatContent, ChatMessage, ChatRequest};
use crate::backend::InferenceBackend;
use crate::core::conversation::ConversationHistory;
use crate::core::error::ChatError;
use crate::core::generation::GenerationConfig;
use crate::core::message::{Message, Role};

pub use registry::{all_models, find_model, ModelEntry, ModelFamily, ModelRegistry};

#[async_trait]
pub trait ModelHandler: Send + Sync {
    /// Canonical registry id, e.g. `smolvlm2`.
    fn model_id(&self) -> &str;

    /// Name the backend knows the model by.
    fn served_model(&self) -> &str;

    fn family(&self) -> ModelFamily;

    fn is_loaded(&self) -> bool;

    /// Acquires the model on the backend. Fails with
    /// [`ChatError::AlreadyLoaded`] rather than loading twice; on failure the
    /// handler stays unloaded and may be retried.
    async fn load_model(&mut self) -> Result<(), ChatError>;

    /// Produces one assistant message answering `history`.
    async fn generate(
        &self,
        history: &ConversationHistory,
        config: &GenerationConfig,
    ) -> Result<Message, ChatError>;
}

/// Everything a constructor needs to build a handler.
pub struct HandlerSpec {
    pub served_model: String,
    pub device: String,
    pub backend: Arc<dyn InferenceBackend>,
}

/// State and backend plumbing shared by every handler family.
pub(crate) struct HandlerCore {
    id: &'static str,
    served_model: String,
    device: String,
    backend: Arc<dyn InferenceBackend>,
    loaded: bool,
}

impl HandlerCore {
    pub(crate) fn new(id: &'static str, spec: HandlerSpec) -> Self {
        info!(
            model = id,
            served_model = %spec.served_model,
            device = %spec.device,
            "initializing handler"
        );
        Self {
            id,
            served_model: spec.served_model,
            device: spec.device,
            backend: spec.backend,
            loaded: false,
        }
    }

    pub(crate) fn id(&self) -> &'static str {
        self.id
    }

    pub(crate) fn served_model(&self) -> &str {
        &self.served_model
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) async fn load(&mut self) -> Result<(), ChatError> {
        if self.loaded {
            return Err(ChatError::AlreadyLoaded {
                model: self.id.to_string(),
            });
        }

        info!(model = self.id, device = %self.device, "loading model");
        match self.backend.probe(&self.served_model, &self.device).await {
            Ok(()) => {
                self.loaded = true;
                info!(model = self.id, "model loaded");
                Ok(())
            }
            Err(source) => {
                warn!(model = self.id, error = %source, "model load failed");
                Err(ChatError::ModelLoad {
                    model: self.id.to_string(),
                    source,
                })
            }
        }
    }

    pub(crate) fn ensure_loaded(&self) -> Result<(), ChatError> {
        if self.loaded {
            Ok(())
        } else {
            Err(ChatError::NotLoaded {
                model: self.id.to_string(),
            })
        }
    }

    pub(crate) fn generation_error(&self, source: crate::backend::BackendError) -> ChatError {
        ChatError::Generation {
            model: self.id.to_string(),
            source,
        }
    }

    /// Sends the flattened conversation and wraps the reply text.
    pub(crate) async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &GenerationConfig,
    ) -> Result<Message, ChatError> {
        let request = ChatRequest {
            model: self.served_model.clone(),
            messages: coalesce_roles(messages),
            stream: false,
            max_tokens: config.max_tokens,
            temperature: config.effective_temperature(),
            top_p: config.top_p,
            device: config.device.clone(),
            extra: config.options.clone(),
        };
        debug!(
            model = self.id,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            top_p = request.top_p,
            device = %request.device,
            options = ?request.extra,
            messages = request.messages.len(),
            "generating"
        );

        let text = self
            .backend
            .complete(&request)
            .await
            .map_err(|source| self.generation_error(source))?;

        Ok(Message::from_text(Role::Assistant, text.trim()))
    }
}

/// Merges runs of same-role messages; chat templates expect strict
/// user/assistant alternation and a failed turn leaves two users in a row.
pub(crate) fn coalesce_roles(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut merged: Vec<ChatMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        match merged.last_mut() {
            Some(previous) if previous.role == message.role => {
                let content = std::mem::replace(&mut previous.content, ChatContent::Text(String::new()));
                previous.content = merge_content(content, message.content);
            }
            _ => merged.push(message),
        }
    }
    merged
}

fn merge_content(first: ChatContent, second: ChatContent) -> ChatContent {
    match (first, second) {
        (ChatContent::Text(a), ChatContent::Text(b)) => ChatContent::Text(format!("{a}\n{b}")),
        (first, second) => {
            let mut parts = into_parts(first);
            parts.extend(into_parts(second));
            ChatContent::Parts(parts)
        }
    }
}

fn into_parts(content: ChatContent) -> Vec<crate::api::ChatContentPart> {
    match content {
        ChatContent::Text(text) => vec![crate::api::ChatContentPart::Text { text }],
        ChatContent::Parts(parts) => parts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatContentPart;

    fn text_message(role: &str, text: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: ChatContent::Text(text.to_string()),
        }
    }

    #[test]
    fn coalesce_joins_repeated_user_text() {
        let merged = coalesce_roles(vec![
            text_message("user", "first"),
            text_message("user", "second"),
            text_message("assistant", "reply"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, ChatContent::Text("first\nsecond".to_string()));
    }

    #[test]
    fn coalesce_concatenates_parts() {
        let parts = |text: &str| ChatMessage {
            role: "user".to_string(),
            content: ChatContent::Parts(vec![ChatContentPart::Text {
                text: text.to_string(),
            }]),
        };
        let merged = coalesce_roles(vec![parts("a"), parts("b")]);
        assert_eq!(merged.len(), 1);
        match &merged[0].content {
            ChatContent::Parts(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn coalesce_keeps_alternating_messages() {
        let merged = coalesce_roles(vec![
            text_message("system", "s"),
            text_message("user", "u"),
            text_message("assistant", "a"),
            text_message("user", "u2"),
        ]);
        assert_eq!(merged.len(), 4);
    }
}
