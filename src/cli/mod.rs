//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod error;
pub mod flags;
pub mod model_list;
pub mod run;
pub mod say;
pub mod settings;
pub mod setup;

use std::error::Error;
use std::io::{self, Write};
use std::sync::LazyLock;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};

use crate::cli::error::CliError;
use crate::cli::model_list::list_models;
use crate::cli::run::run_chat;
use crate::cli::say::run_say;
use crate::cli::settings::{print_config, run_set, run_unset, SettingError, SettingRegistry};
use crate::cli::setup::GenerationArgs;
use crate::utils::logging;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown")
    )
});

#[derive(Parser)]
#[command(name = "qllama", version, long_version = LONG_VERSION.as_str())]
#[command(about = "Chat with multimodal language models from the terminal")]
#[command(
    long_about = "qllama gives direct, low-level access to multimodal language models \
(text, image, video) served by an OpenAI-compatible inference server.\n\n\
Media:\n\
  <image:/path/to/image.jpg>         Attach a local image\n\
  <image:https://example.com/a.jpg>  Attach a remote image\n\
  <video:/path/to/video.mp4>         Attach a video\n\n\
Per-message settings go at the end of a line:\n\
  describe <image:cat.jpg> --temperature 0.2 --max-tokens 128\n\n\
Commands inside a chat:\n\
  /help /reset /history /dump [file]   exit or quit to leave\n\n\
Logging:\n\
  -v for info, -vv for debug; otherwise RUST_LOG is honoured (default warn)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase log detail on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with a model
    Run {
        /// Model id (see `qllama list`)
        model: String,
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// List the known models
    List,
    /// Send one prompt and print the reply
    Say {
        /// Model id (see `qllama list`)
        model: String,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Prompt text; may contain <image:...> and <video:...> tags
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// Set configuration values
    ///
    /// Keys: endpoint, api-key-env, device, temperature, max-tokens, top-p,
    /// do-sample, system-prompt, request-timeout, served-model <id> <name>,
    /// option <key> <value>. Without a value, prints the configuration.
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
        /// Entry to remove for keyed settings (served-model, option)
        value: Option<String>,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let Some(command) = args.command else {
        Args::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Run { model, generation } => {
            exit_on_cli_error(run_chat(&model, &generation).await);
            Ok(())
        }
        Commands::List => list_models(),
        Commands::Say {
            model,
            generation,
            prompt,
        } => {
            exit_on_cli_error(run_say(&model, &generation, prompt).await);
            Ok(())
        }
        Commands::Set { key, value } => {
            let registry = SettingRegistry::new();
            let value = value.unwrap_or_default();
            let result = run_set(&registry, &key, &value, &mut io::stdout().lock());
            exit_on_setting_error(&registry, result);
            Ok(())
        }
        Commands::Unset { key, value } => {
            let registry = SettingRegistry::new();
            let result = run_unset(&registry, &key, value.as_deref(), &mut io::stdout().lock());
            exit_on_setting_error(&registry, result);
            Ok(())
        }
        Commands::Config => {
            let registry = SettingRegistry::new();
            let result = print_config(&mut io::stdout().lock());
            exit_on_setting_error(&registry, result);
            Ok(())
        }
    }
}

fn exit_on_cli_error(result: Result<(), CliError>) {
    if let Err(err) = result {
        let _ = io::stdout().flush();
        err.print();
        std::process::exit(err.exit_code());
    }
}

fn exit_on_setting_error(registry: &SettingRegistry, result: Result<(), SettingError>) {
    if let Err(err) = result {
        err.print();
        if matches!(err, SettingError::UnknownKey(_)) {
            eprintln!("   Keys: {}", registry.keys_display_order().join(", "));
        }
        std::process::exit(err.exit_code());
    }
}
