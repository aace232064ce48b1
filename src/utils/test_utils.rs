use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::api::ChatRequest;
use crate::backend::{BackendError, InferenceBackend};

/// In-memory backend that records every call and replays queued outcomes.
///
/// Probes succeed unless a failure was queued with [`fail_next_probe`];
/// completions return queued replies in order, falling back to `"ok"`.
///
/// [`fail_next_probe`]: ScriptedBackend::fail_next_probe
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    probe_failures: Mutex<VecDeque<BackendError>>,
    requests: Mutex<Vec<ChatRequest>>,
    probes: Mutex<Vec<(String, String)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_reply(&self, reply: &str) {
        lock(&self.replies).push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, error: BackendError) {
        lock(&self.replies).push_back(Err(error));
    }

    pub fn fail_next_probe(&self, error: BackendError) {
        lock(&self.probe_failures).push_back(error);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }

    /// `(model, device)` pairs in probe order.
    pub fn probes(&self) -> Vec<(String, String)> {
        lock(&self.probes).clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn probe(&self, model: &str, device: &str) -> Result<(), BackendError> {
        lock(&self.probes).push((model.to_string(), device.to_string()));
        match lock(&self.probe_failures).pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
        lock(&self.requests).push(request.clone());
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }
}

pub fn status_error(status: u16) -> BackendError {
    BackendError::Status {
        status,
        body: "scripted failure".to_string(),
    }
}
