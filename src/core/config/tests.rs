use super::data::{path_display, Config};
use super::io::ConfigError;
use super::orchestrator::ConfigOrchestrator;
use crate::core::generation::{GenerationConfigError, DEFAULT_MAX_TOKENS};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn config_orchestrator_detects_external_updates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    orchestrator
        .mutate(|config| {
            config.device = Some("cpu".to_string());
            Ok(())
        })
        .expect("mutate failed");

    let persisted = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(persisted.device.as_deref(), Some("cpu"));

    let cached = orchestrator.load_with_cache().expect("cached load failed");
    assert_eq!(cached.device.as_deref(), Some("cpu"));

    std::thread::sleep(Duration::from_millis(1100));

    let external = Config {
        device: Some("mps".to_string()),
        ..Default::default()
    };
    external
        .save_to_path(&config_path)
        .expect("external save failed");

    let reloaded = orchestrator.load_with_cache().expect("reload failed");
    assert_eq!(reloaded.device.as_deref(), Some("mps"));
}

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.endpoint(), "http://localhost:8000/v1");
    assert_eq!(config.request_timeout(), Duration::from_secs(300));
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config {
        endpoint: Some("http://gpu-box:8000/v1".to_string()),
        temperature: Some(0.7),
        ..Default::default()
    };
    config.set_served_model("SmolVLM2", "smolvlm".to_string());
    config.set_option("repetition_penalty".to_string(), json!(1.1));
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.served_model_override("smolvlm2"), Some("smolvlm"));
    assert_eq!(loaded.options.get("repetition_penalty"), Some(&json!(1.1)));

    let mut modified = loaded;
    modified.temperature = None;
    modified.unset_served_model("smolvlm2");
    assert!(modified.unset_option("repetition_penalty"));
    assert!(!modified.unset_option("repetition_penalty"));
    modified
        .save_to_path(&config_path)
        .expect("Failed to save modified config");

    let reloaded = Config::load_from_path(&config_path).expect("Failed to reload config");
    assert_eq!(reloaded.temperature, None);
    assert!(reloaded.models.is_empty());
    assert!(reloaded.options.is_empty());
    assert_eq!(reloaded.endpoint(), "http://gpu-box:8000/v1");
}

#[test]
fn test_parse_error_names_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "temperature = \"warm\"\n").unwrap();

    match Config::load_from_path(&config_path) {
        Err(err @ ConfigError::Parse { .. }) => {
            let message = err.to_string();
            assert!(message.starts_with("Failed to parse config at"), "{message}");
            assert!(message.contains("config.toml"), "{message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_save_error_names_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let config_path = blocker.join("config.toml");

    match Config::default().save_to_path(&config_path) {
        Err(err @ ConfigError::Write { .. }) => {
            let message = err.to_string();
            assert!(message.starts_with("Failed to write config to"), "{message}");
            assert!(message.contains("config.toml"), "{message}");
        }
        other => panic!("expected write error, got {other:?}"),
    }
}

#[test]
fn test_failed_mutation_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    let result: Result<(), _> = orchestrator.mutate(|config| {
        config.device = Some("cpu".to_string());
        Err("rejected".into())
    });

    assert!(result.is_err());
    assert!(!config_path.exists());
    assert_eq!(orchestrator.load_with_cache().unwrap(), Config::default());
}

#[test]
fn test_toml_tables_are_read() {
    let config: Config = toml::from_str(
        r#"
endpoint = "http://localhost:9000/v1"
device = "cuda:1"
max_tokens = 256
do_sample = false

[options]
repetition_penalty = 1.2
stop = ["</s>"]

[models.mistral]
served_model = "mistral-7b"
"#,
    )
    .expect("valid toml");

    assert_eq!(config.served_model_override("Mistral"), Some("mistral-7b"));
    assert_eq!(config.served_model_override("smolvlm2"), None);
    assert_eq!(config.options.get("stop"), Some(&json!(["</s>"])));

    let defaults = config.generation_defaults().expect("valid defaults");
    assert_eq!(defaults.device, "cuda:1");
    assert_eq!(defaults.max_tokens, 256);
    assert!(!defaults.do_sample);
    assert_eq!(defaults.options.len(), 2);
}

#[test]
fn test_generation_defaults_fall_back_to_builtins() {
    let defaults = Config::default()
        .generation_defaults()
        .expect("builtin defaults are valid");
    assert_eq!(defaults.device, "cuda");
    assert_eq!(defaults.temperature, 1.0);
    assert_eq!(defaults.max_tokens, DEFAULT_MAX_TOKENS);
    assert!(defaults.do_sample);
}

#[test]
fn test_generation_defaults_are_validated() {
    let config = Config {
        temperature: Some(-1.0),
        ..Default::default()
    };
    assert_eq!(
        config.generation_defaults(),
        Err(GenerationConfigError::InvalidTemperature(-1.0))
    );

    let config = Config {
        max_tokens: Some(0),
        ..Default::default()
    };
    assert_eq!(
        config.generation_defaults(),
        Err(GenerationConfigError::InvalidMaxTokens)
    );
}

#[test]
fn test_api_key_reads_named_variable() {
    let var = "QLLAMA_TEST_API_KEY_READS_NAMED_VARIABLE";
    let config = Config {
        api_key_env: Some(var.to_string()),
        ..Default::default()
    };
    std::env::remove_var(var);
    assert_eq!(config.api_key(), None);

    std::env::set_var(var, "secret");
    assert_eq!(config.api_key().as_deref(), Some("secret"));
    std::env::remove_var(var);

    assert_eq!(Config::default().api_key(), None);
}

#[test]
fn test_system_prompt_ignores_blank_values() {
    let config = Config {
        system_prompt: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(config.system_prompt(), None);

    let config = Config {
        system_prompt: Some(" Be brief. ".to_string()),
        ..Default::default()
    };
    assert_eq!(config.system_prompt(), Some("Be brief."));
}

#[test]
fn test_print_all_marks_defaults() {
    let mut config = Config {
        device: Some("cpu".to_string()),
        do_sample: Some(false),
        ..Default::default()
    };
    config.set_served_model("mistral", "mistral-local".to_string());

    let mut out = Vec::new();
    config
        .print_all(&mut out, &PathBuf::from("/tmp/qllama/config.toml"))
        .expect("write to vec");
    let printed = String::from_utf8(out).unwrap();

    assert!(printed.contains("Current configuration (/tmp/qllama/config.toml):"));
    assert!(printed.contains("  endpoint: http://localhost:8000/v1 (default)"));
    assert!(printed.contains("  device: cpu\n"));
    assert!(printed.contains("  max-tokens: 64 (default)"));
    assert!(printed.contains("  do-sample: off\n"));
    assert!(printed.contains("  options: (none set)"));
    assert!(printed.contains("    mistral: mistral-local"));
}

#[cfg(unix)]
#[test]
fn test_path_display_uses_tilde_under_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("qllama");
        assert_eq!(path_display(&path), "~/.config/qllama");
    }
    assert_eq!(path_display("/etc/qllama.toml"), "/etc/qllama.toml");
}

#[test]
fn test_config_override_routes_load_and_mutate() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    Config::set_test_config_path(config_path.clone());

    Config::mutate(|config| {
        config.max_tokens = Some(128);
        Ok(())
    })
    .expect("mutate failed");
    let loaded = Config::load().expect("load failed");
    assert_eq!(loaded.max_tokens, Some(128));
    assert_eq!(Config::active_path(), config_path);

    Config::clear_test_config_override();
    assert_eq!(Config::load().expect("load failed"), Config::default());
}
