//! Handler for vision-language models that accept images and video.

use async_trait::async_trait;

use crate::api::{ChatContent, ChatContentPart, ChatMessage, MediaUrl};
use crate::backend::BackendError;
use crate::core::conversation::ConversationHistory;
use crate::core::error::ChatError;
use crate::core::generation::GenerationConfig;
use crate::core::message::{ContentPart, Message, Role};
use crate::models::encode::media_url;
use crate::models::{HandlerCore, HandlerSpec, ModelFamily, ModelHandler};

pub struct VisionHandler {
    core: HandlerCore,
}

impl VisionHandler {
    pub fn new(id: &'static str, spec: HandlerSpec) -> Self {
        Self {
            core: HandlerCore::new(id, spec),
        }
    }
}

async fn encode_message(message: &Message) -> Result<ChatMessage, BackendError> {
    if message.role() == Role::System {
        return Ok(ChatMessage {
            role: message.role().as_str().to_string(),
            content: ChatContent::Text(message.text()),
        });
    }

    let mut parts = Vec::with_capacity(message.content().len());
    for part in message.content() {
        let encoded = match part {
            ContentPart::Text(text) => ChatContentPart::Text { text: text.clone() },
            ContentPart::Image(reference) => ChatContentPart::ImageUrl {
                image_url: MediaUrl {
                    url: media_url(reference).await?,
                },
            },
            ContentPart::Video(reference) => ChatContentPart::VideoUrl {
                video_url: MediaUrl {
                    url: media_url(reference).await?,
                },
            },
        };
        parts.push(encoded);
    }

    Ok(ChatMessage {
        role: message.role().as_str().to_string(),
        content: ChatContent::Parts(parts),
    })
}

#[async_trait]
impl ModelHandler for VisionHandler {
    fn model_id(&self) -> &str {
        self.core.id()
    }

    fn served_model(&self) -> &str {
        self.core.served_model()
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::Vision
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

        let mut messages = Vec::with_capacity(history.header().len() + history.len());
        for message in history.iter() {
            let encoded = encode_message(message)
                .await
                .map_err(|source| self.core.generation_error(source))?;
            messages.push(encoded);
        }

        self.core.complete(messages, config).await
    }
}
