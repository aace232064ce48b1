//! One-shot `say` command: load, answer one prompt, exit.

use std::io::{self, Write};

use crate::cli::error::CliError;
use crate::cli::setup::{prepare_session, GenerationArgs};
use crate::core::error::ChatError;
use crate::core::generation::GenerationOverrides;
use crate::core::session::ChatSession;

pub async fn run_say(model: &str, args: &GenerationArgs, prompt: Vec<String>) -> Result<(), CliError> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err(ChatError::EmptyMessage.into());
    }

    let mut session = prepare_session(model, args)?;
    session.load().await?;

    let stdout = io::stdout();
    say_once(&mut session, &prompt, &mut stdout.lock()).await
}

/// Submits `prompt` as a single turn and writes the reply.
pub async fn say_once<W: Write>(
    session: &mut ChatSession,
    prompt: &str,
    out: &mut W,
) -> Result<(), CliError> {
    let reply = session
        .submit_turn(prompt, &GenerationOverrides::default())
        .await?;
    writeln!(out, "{}", reply.text())?;
    out.flush()?;
    Ok(())
}
