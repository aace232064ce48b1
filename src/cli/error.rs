//! Errors surfaced by the `run` and `say` commands.

use std::error::Error;
use std::fmt;
use std::io;

use crate::backend::BackendError;
use crate::core::error::ChatError;
use crate::core::generation::GenerationConfigError;

#[derive(Debug)]
pub enum CliError {
    /// The configuration file could not be loaded.
    Config(Box<dyn Error>),
    /// Configured or command-line generation parameters are invalid.
    Parameters(GenerationConfigError),
    /// The HTTP client could not be built.
    Backend(BackendError),
    /// Session setup, model load or generation failed.
    Chat(ChatError),
    /// Reading input or writing output failed.
    Io(io::Error),
}

impl CliError {
    /// Print the error to stderr with a hint where one helps.
    pub fn print(&self) {
        eprintln!("❌ {self}");
        match self {
            CliError::Chat(ChatError::UnknownModel { .. }) => {
                eprintln!("   Run 'qllama list' to see the available models.");
            }
            CliError::Chat(ChatError::ModelLoad { .. }) => {
                eprintln!("   Check the server with 'qllama config' (endpoint, device).");
            }
            CliError::Parameters(_) => {
                eprintln!("   Run 'qllama config' to review the stored defaults.");
            }
            _ => {}
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Chat(err) => err.exit_code(),
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(err) => write!(f, "Failed to load configuration: {err}"),
            CliError::Parameters(err) => write!(f, "Invalid generation parameters: {err}"),
            CliError::Backend(err) => write!(f, "Failed to set up backend: {err}"),
            CliError::Chat(err) => write!(f, "{err}"),
            CliError::Io(err) => write!(f, "Terminal I/O failed: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Config(err) => Some(err.as_ref()),
            CliError::Parameters(err) => Some(err),
            CliError::Backend(err) => Some(err),
            CliError::Chat(err) => Some(err),
            CliError::Io(err) => Some(err),
        }
    }
}

impl From<GenerationConfigError> for CliError {
    fn from(err: GenerationConfigError) -> Self {
        CliError::Parameters(err)
    }
}

impl From<BackendError> for CliError {
    fn from(err: BackendError) -> Self {
        CliError::Backend(err)
    }
}

impl From<ChatError> for CliError {
    fn from(err: ChatError) -> Self {
        CliError::Chat(err)
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}
