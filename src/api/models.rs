use crate::api::{ModelInfo, ModelsResponse};
use crate::backend::BackendError;
use crate::utils::url::construct_api_url;

pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
) -> Result<ModelsResponse, BackendError> {
    let models_url = construct_api_url(base_url, "models");
    let mut request = client
        .get(models_url)
        .header("Content-Type", "application/json");

    if let Some(api_key) = api_key {
        request = request.header("Authorization", format!("Bearer {api_key}"));
    }

    let response = request.send().await.map_err(BackendError::Transport)?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(BackendError::Status { status, body });
    }

    response
        .json::<ModelsResponse>()
        .await
        .map_err(|err| BackendError::MalformedResponse(err.to_string()))
}

/// Servers report ids with varying case; match the way users type them.
pub fn find_served_model<'a>(models: &'a [ModelInfo], name: &str) -> Option<&'a ModelInfo> {
    models
        .iter()
        .find(|model| model.id.eq_ignore_ascii_case(name))
}
