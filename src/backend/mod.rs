//! The boundary to whatever actually runs the model.
//!
//! Handlers never talk to a server directly; they go through
//! [`InferenceBackend`], which has exactly two capabilities: check that a
//! model can be served, and run one chat completion.

pub mod http;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;

use crate::api::ChatRequest;

pub use http::HttpBackend;

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Confirms `model` is available on `device`.
    async fn probe(&self, model: &str, device: &str) -> Result<(), BackendError>;

    /// Runs one generation and returns the raw completion text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

#[derive(Debug)]
pub enum BackendError {
    /// The request never got a response.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body was not what the protocol promises.
    MalformedResponse(String),
    /// The server is up but does not serve the model.
    ModelNotServed {
        model: String,
        available: Vec<String>,
    },
    UnsupportedDevice(String),
    /// A local media file could not be read.
    Media {
        locator: String,
        source: std::io::Error,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(err) => write!(f, "request failed: {err}"),
            BackendError::Status { status, body } => {
                write!(f, "server returned status {status}: {body}")
            }
            BackendError::MalformedResponse(detail) => {
                write!(f, "unexpected response from server: {detail}")
            }
            BackendError::ModelNotServed { model, available } => {
                write!(f, "model {model} is not served by the backend")?;
                if !available.is_empty() {
                    write!(f, " (serving: {})", available.join(", "))?;
                }
                Ok(())
            }
            BackendError::UnsupportedDevice(device) => write!(
                f,
                "unsupported device {device:?} (expected cpu, cuda, cuda:N, mps or auto)"
            ),
            BackendError::Media { locator, source } => {
                write!(f, "cannot read media {locator}: {source}")
            }
        }
    }
}

impl StdError for BackendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            BackendError::Transport(err) => Some(err),
            BackendError::Media { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Accepts `cpu`, `cuda`, `cuda:N`, `mps` and `auto`.
pub fn validate_device(device: &str) -> Result<(), BackendError> {
    let normalized = device.trim().to_ascii_lowercase();
    let valid = match normalized.split_once(':') {
        Some(("cuda", index)) => !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()),
        Some(_) => false,
        None => matches!(normalized.as_str(), "cpu" | "cuda" | "mps" | "auto"),
    };

    if valid {
        Ok(())
    } else {
        Err(BackendError::UnsupportedDevice(device.to_string()))
    }
}
