use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::api::models::{fetch_models, find_served_model};
use crate::api::{ChatCompletionResponse, ChatRequest};
use crate::backend::{validate_device, BackendError, InferenceBackend};
use crate::utils::url::{construct_api_url, normalize_base_url};

/// Talks to an OpenAI-compatible server (vLLM, llama.cpp, TGI).
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Transport)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl InferenceBackend for HttpBackend {
    async fn probe(&self, model: &str, device: &str) -> Result<(), BackendError> {
        validate_device(device)?;

        let models = fetch_models(&self.client, &self.base_url, self.api_key.as_deref()).await?;
        if find_served_model(&models.data, model).is_some() {
            debug!(model, base_url = %self.base_url, "model is served");
            return Ok(());
        }

        Err(BackendError::ModelNotServed {
            model: model.to_string(),
            available: models.data.into_iter().map(|m| m.id).collect(),
        })
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let url = construct_api_url(&self.base_url, "chat/completions");
        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = builder.send().await.map_err(BackendError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Status { status, body });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|err| BackendError::MalformedResponse(err.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::MalformedResponse("no choices".to_string()))?;
        debug!(finish_reason = ?choice.finish_reason, "completion finished");

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_rejects_bad_device_before_any_request() {
        // Port 9 (discard) is never contacted: the device check runs first.
        let backend =
            HttpBackend::new("http://127.0.0.1:9/v1/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:9/v1");

        let err = backend.probe("any", "tpu").await.unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedDevice(_)));
    }
}
