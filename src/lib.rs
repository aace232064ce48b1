//! qllama is a terminal chat front-end for multimodal language models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns messages, the inline media tag resolver, generation
//!   parameters, conversation history, the chat session and the config file.
//! - [`models`] maps model ids to handlers that adapt one model family to a
//!   uniform load/generate interface.
//! - [`backend`] is the boundary to the inference server; [`api`] holds its
//!   OpenAI-compatible wire types.
//! - [`commands`] implements the slash commands of the interactive loop.
//! - [`cli`] parses arguments and runs `run`, `say`, `list` and the settings
//!   commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod core;
pub mod models;
pub mod utils;
