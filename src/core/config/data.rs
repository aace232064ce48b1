use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-model settings under `[models.<id>]`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ModelOverride {
    /// Name the backend serves this registry id under.
    pub served_model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the OpenAI-compatible server, e.g. `http://localhost:8000/v1`
    pub endpoint: Option<String>,
    /// Name of the environment variable holding a bearer token
    pub api_key_env: Option<String>,
    pub device: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub do_sample: Option<bool>,
    /// Sent as a system message ahead of every conversation
    pub system_prompt: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Extra generation options forwarded verbatim in each request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    /// Keyed by canonical registry id (e.g. "smolvlm2")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, ModelOverride>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/qllama/config.toml` → `~/.config/qllama/config.toml`
/// - macOS: `/Users/user/Library/Application Support/...` → `~/Library/Application Support/...`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
