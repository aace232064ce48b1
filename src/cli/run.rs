//! The interactive chat loop behind `qllama run`.

use std::io::{self, BufRead, Write};
use tracing::warn;

use crate::cli::error::CliError;
use crate::cli::flags::split_trailing_flags;
use crate::cli::setup::{prepare_session, GenerationArgs};
use crate::commands::{process_input, CommandResult};
use crate::core::session::ChatSession;
use crate::utils::input::sanitize_line;

const PROMPT: &str = ">>> ";

pub fn write_banner<W: Write>(out: &mut W, model: &str) -> io::Result<()> {
    writeln!(out, "qllama chat with {model} 🦙")?;
    writeln!(
        out,
        "Type 'exit' or 'quit' to end the conversation, '/help' for commands."
    )?;
    writeln!(
        out,
        "To include images: <image:/path/to/image.jpg> or <image:https://example.com/image.jpg>"
    )?;
    writeln!(out, "To include videos: <video:/path/to/video.mp4>")?;
    writeln!(
        out,
        "Per-message settings go at the end: describe <image:cat.jpg> --temperature 0.2"
    )?;
    writeln!(out)
}

/// Reads lines from `input` until EOF or a quit word.
///
/// Failed turns and undecodable lines are reported and the loop carries
/// on; only I/O errors end it early.
pub async fn drive<R: BufRead, W: Write>(
    session: &mut ChatSession,
    mut input: R,
    out: &mut W,
    interactive: bool,
) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        if interactive {
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            if interactive {
                writeln!(out)?;
            }
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "skipping undecodable input line");
                writeln!(out, "Error: input is not valid UTF-8 ({err})")?;
                continue;
            }
        };

        let text = sanitize_line(line);
        if text.trim().is_empty() {
            continue;
        }

        let message = match process_input(session, &text) {
            CommandResult::Quit => {
                writeln!(out, "Exiting qllama. Goodbye!")?;
                break;
            }
            CommandResult::Handled(reply) => {
                writeln!(out, "{reply}")?;
                continue;
            }
            CommandResult::ProcessAsMessage(message) => message,
        };

        let (prompt, overrides) = match split_trailing_flags(&message) {
            Ok(split) => split,
            Err(err) => {
                writeln!(out, "Error: {err}")?;
                continue;
            }
        };

        match session.submit_turn(prompt, &overrides).await {
            Ok(reply) => writeln!(out, "{}\n", reply.text())?,
            Err(err) => {
                warn!(error = %err, "turn failed");
                writeln!(out, "Error: {err}")?;
            }
        }
    }
    out.flush()
}

/// `qllama run <model>`: load, print the banner, then chat on stdin/stdout.
pub async fn run_chat(model: &str, args: &GenerationArgs) -> Result<(), CliError> {
    let mut session = prepare_session(model, args)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Loading {model}...")?;
    out.flush()?;
    session.load().await?;
    writeln!(out, "{model} loaded successfully!")?;
    writeln!(out)?;
    write_banner(&mut out, session.handler().model_id())?;

    let stdin = io::stdin();
    drive(&mut session, stdin.lock(), &mut out, true).await?;
    Ok(())
}
