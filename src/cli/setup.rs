//! Building a [`ChatSession`] from the config file and command-line flags.

use clap::Args as ClapArgs;
use std::sync::Arc;
use tracing::info;

use crate::backend::{validate_device, HttpBackend, InferenceBackend};
use crate::cli::error::CliError;
use crate::core::config::Config;
use crate::core::generation::{parse_option, GenerationConfigError, GenerationOverrides};
use crate::core::session::ChatSession;
use crate::models::ModelRegistry;

/// Generation flags shared by `run` and `say`. They override the config
/// file for the whole session.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct GenerationArgs {
    /// Device to load the model on (cpu, cuda, cuda:N, mps, auto)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Sampling temperature (greater than 0)
    #[arg(long, value_name = "T")]
    pub temperature: Option<f32>,

    /// Maximum number of new tokens per reply
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling threshold in (0, 1]
    #[arg(long, value_name = "P")]
    pub top_p: Option<f32>,

    /// Sample from the distribution
    #[arg(long, conflicts_with = "no_sample")]
    pub sample: bool,

    /// Greedy decoding
    #[arg(long)]
    pub no_sample: bool,

    /// Extra backend option, repeatable (e.g. --option seed=42)
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// System prompt placed before the conversation
    #[arg(long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// Backend base URL for this session
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
}

impl GenerationArgs {
    pub fn overrides(&self) -> Result<GenerationOverrides, GenerationConfigError> {
        let mut overrides = GenerationOverrides {
            device: self.device.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            do_sample: match (self.sample, self.no_sample) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            ..GenerationOverrides::default()
        };

        if let Some(device) = &overrides.device {
            validate_device(device).map_err(|_| GenerationConfigError::InvalidValue {
                flag: "device".to_string(),
                value: device.clone(),
            })?;
        }

        for spec in &self.options {
            let (key, value) = parse_option(spec)?;
            overrides.options.insert(key, value);
        }
        Ok(overrides)
    }
}

/// Resolves defaults and builds an unloaded session for `model`.
pub fn build_session(
    config: &Config,
    model: &str,
    args: &GenerationArgs,
    backend: Arc<dyn InferenceBackend>,
) -> Result<ChatSession, CliError> {
    let defaults = config.generation_defaults()?.merged(&args.overrides()?)?;

    let mut registry = ModelRegistry::new(backend, defaults.device.clone());
    for (id, entry) in &config.models {
        if let Some(served) = &entry.served_model {
            registry = registry.with_served_model(id, served.clone());
        }
    }

    let handler = registry.get_handler(model)?;
    let mut session = ChatSession::new(handler, defaults);

    let system_prompt = args
        .system_prompt
        .as_deref()
        .or_else(|| config.system_prompt());
    if let Some(prompt) = system_prompt {
        session = session.with_system_prompt(prompt)?;
    }
    Ok(session)
}

/// Builds a session against the configured HTTP backend. The model is not
/// loaded yet.
pub fn prepare_session(model: &str, args: &GenerationArgs) -> Result<ChatSession, CliError> {
    let config = Config::load().map_err(CliError::Config)?;
    let endpoint = args.endpoint.as_deref().unwrap_or_else(|| config.endpoint());
    info!(endpoint, model, "preparing session");

    let backend = HttpBackend::new(endpoint, config.api_key(), config.request_timeout())?;
    build_session(&config, model, args, Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ModelOverride;
    use crate::core::error::ChatError;
    use crate::core::message::Role;
    use crate::utils::test_utils::ScriptedBackend;
    use serde_json::json;

    #[test]
    fn flags_become_overrides() {
        let args = GenerationArgs {
            device: Some("cuda:1".to_string()),
            temperature: Some(0.3),
            no_sample: true,
            options: vec!["seed=7".to_string()],
            ..GenerationArgs::default()
        };
        let overrides = args.overrides().unwrap();
        assert_eq!(overrides.device.as_deref(), Some("cuda:1"));
        assert_eq!(overrides.temperature, Some(0.3));
        assert_eq!(overrides.do_sample, Some(false));
        assert_eq!(overrides.options["seed"], json!(7));
    }

    #[test]
    fn bad_flags_are_rejected() {
        let args = GenerationArgs {
            device: Some("tpu".to_string()),
            ..GenerationArgs::default()
        };
        assert!(args.overrides().is_err());

        let args = GenerationArgs {
            options: vec!["stream=true".to_string()],
            ..GenerationArgs::default()
        };
        assert_eq!(
            args.overrides(),
            Err(GenerationConfigError::ReservedOption("stream".to_string()))
        );
    }

    #[test]
    fn flags_override_config_defaults() {
        let config = Config {
            device: Some("cpu".to_string()),
            temperature: Some(0.5),
            max_tokens: Some(200),
            ..Config::default()
        };
        let args = GenerationArgs {
            max_tokens: Some(32),
            ..GenerationArgs::default()
        };

        let session = build_session(&config, "mistral", &args, ScriptedBackend::new()).unwrap();
        let defaults = session.defaults();
        assert_eq!(defaults.device, "cpu");
        assert_eq!(defaults.temperature, 0.5);
        assert_eq!(defaults.max_tokens, 32);
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn served_model_override_reaches_the_backend() {
        let mut config = Config {
            device: Some("cpu".to_string()),
            ..Config::default()
        };
        config.models.insert(
            "smolvlm2".to_string(),
            ModelOverride {
                served_model: Some("local/smol".to_string()),
            },
        );

        let backend = ScriptedBackend::new();
        let mut session =
            build_session(&config, "smolvlm2", &GenerationArgs::default(), backend.clone())
                .unwrap();
        session.load().await.unwrap();

        assert_eq!(
            backend.probes(),
            vec![("local/smol".to_string(), "cpu".to_string())]
        );
    }

    #[test]
    fn system_prompt_flag_wins_over_config() {
        let config = Config {
            device: Some("cpu".to_string()),
            system_prompt: Some("from config".to_string()),
            ..Config::default()
        };
        let args = GenerationArgs {
            system_prompt: Some("from flag".to_string()),
            ..GenerationArgs::default()
        };

        let session = build_session(&config, "mistral", &args, ScriptedBackend::new()).unwrap();
        let header = session.history().header();
        assert_eq!(header.len(), 1);
        assert_eq!(header[0].role(), Role::System);
        assert_eq!(header[0].text(), "from flag");
    }

    #[test]
    fn unknown_model_exits_with_two() {
        let err = build_session(
            &Config::default(),
            "llama-9000",
            &GenerationArgs::default(),
            ScriptedBackend::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CliError::Chat(ChatError::UnknownModel { .. })));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_config_defaults_are_reported() {
        let config = Config {
            top_p: Some(1.5),
            ..Config::default()
        };
        let err = build_session(&config, "mistral", &GenerationArgs::default(), ScriptedBackend::new())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            CliError::Parameters(GenerationConfigError::InvalidTopP(_))
        ));
        assert_eq!(err.exit_code(), 1);
    }
}
