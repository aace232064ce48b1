//! Handler for text-only instruction models.

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatContent, ChatMessage};
use crate::core::conversation::ConversationHistory;
use crate::core::error::ChatError;
use crate::core::generation::GenerationConfig;
use crate::core::message::Message;
use crate::models::{HandlerCore, HandlerSpec, ModelFamily, ModelHandler};

pub struct TextHandler {
    core: HandlerCore,
}

impl TextHandler {
    pub fn new(id: &'static str, spec: HandlerSpec) -> Self {
        Self {
            core: HandlerCore::new(id, spec),
        }
    }
}

/// Keeps only the text of a message; the model cannot see media.
fn flatten_message(model: &str, message: &Message) -> ChatMessage {
    let skipped = message.media().count();
    if skipped > 0 {
        debug!(model, skipped, "dropping media from text-only prompt");
    }

    ChatMessage {
        role: message.role().as_str().to_string(),
        content: ChatContent::Text(message.text().trim().to_string()),
    }
}

#[async_trait]
impl ModelHandler for TextHandler {
    fn model_id(&self) -> &str {
        self.core.id()
    }

    fn served_model(&self) -> &str {
        self.core.served_model()
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::Text
    }

    fn is_loaded(&self) -> bool {
        self.core.is_loaded()
    }

    async fn load_model(&mut self) -> Result<(), ChatError> {
        self.core.load().await
    }

    async fn generate(
        &self,
        history: &ConversationHistory,
        config: &GenerationConfig,
    ) -> Result<Message, ChatError> {
        self.core.ensure_loaded()?;

        let messages = history
            .iter()
            .map(|message| flatten_message(self.core.id(), message))
            .collect();

        self.core.complete(messages, config).await
    }
}
