//! One conversation with one model.

use tracing::{debug, info};

use crate::core::conversation::ConversationHistory;
use crate::core::error::ChatError;
use crate::core::generation::{GenerationConfig, GenerationOverrides};
use crate::core::media::resolve;
use crate::core::message::{Message, Role};
use crate::models::ModelHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Ready,
}

/// Owns the history and the handler; the only thing that appends to the
/// history.
pub struct ChatSession {
    handler: Box<dyn ModelHandler>,
    history: ConversationHistory,
    defaults: GenerationConfig,
}

impl ChatSession {
    pub fn new(handler: Box<dyn ModelHandler>, defaults: GenerationConfig) -> Self {
        Self {
            handler,
            history: ConversationHistory::new(),
            defaults,
        }
    }

    /// Installs a system prompt as a fixed header that survives [`reset`].
    ///
    /// [`reset`]: ChatSession::reset
    pub fn with_system_prompt(mut self, prompt: &str) -> Result<Self, ChatError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(self);
        }
        let header = vec![Message::from_text(Role::System, prompt)];
        let mut history = ConversationHistory::with_header(header)?;
        for message in self.history.turns() {
            history.append(message.clone())?;
        }
        self.history = history;
        Ok(self)
    }

    pub fn state(&self) -> SessionState {
        if self.handler.is_loaded() {
            SessionState::Ready
        } else {
            SessionState::Unloaded
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    pub async fn load(&mut self) -> Result<(), ChatError> {
        self.handler.load_model().await
    }

    /// Runs one user turn and returns the assistant reply.
    ///
    /// Nothing is recorded when the session is not ready, the overrides are
    /// invalid or the input is empty. Once the user message is appended it
    /// stays, even if generation fails.
    pub async fn submit_turn(
        &mut self,
        raw_text: &str,
        overrides: &GenerationOverrides,
    ) -> Result<Message, ChatError> {
        if !self.is_ready() {
            return Err(ChatError::NotLoaded {
                model: self.handler.model_id().to_string(),
            });
        }

        let config = self.defaults.merged(overrides)?;
        let user = Message::build(Role::User, resolve(raw_text))?;
        debug!(
            parts = user.content().len(),
            media = user.media().count(),
            "appending user turn"
        );
        self.history.append(user)?;

        let reply = self.handler.generate(&self.history, &config).await?;
        self.history.append(reply.clone())?;
        Ok(reply)
    }

    /// Drops every turn; the header and the handler's load state stay.
    pub fn reset(&mut self) {
        info!(turns = self.history.len(), "resetting conversation");
        self.history.clear();
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn defaults(&self) -> &GenerationConfig {
        &self.defaults
    }

    pub fn handler(&self) -> &dyn ModelHandler {
        self.handler.as_ref()
    }

    /// Completed user/assistant exchanges.
    pub fn turn_count(&self) -> usize {
        self.history.reply_count()
    }
}
