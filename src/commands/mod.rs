//! Slash commands understood by the interactive loop.

mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::core::message::Role;
use crate::core::session::ChatSession;
use crate::utils::input::is_quit_command;

/// Number of messages `/history` shows.
const HISTORY_PREVIEW: usize = 6;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// The command ran; print this text and read the next line.
    Handled(String),
    Quit,
    /// Not a command; send the line to the model.
    ProcessAsMessage(String),
}

pub fn process_input(session: &mut ChatSession, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if is_quit_command(trimmed) {
        return CommandResult::Quit;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match find_command(command_name) {
        Some(command) => {
            let invocation = CommandInvocation {
                input: trimmed,
                args,
            };
            (command.handler)(session, invocation)
        }
        // `/path/to/file` at the start of a prompt is text, not a command.
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

pub fn help_text() -> String {
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<14} {}\n", command.usage, command.help));
    }
    help.push_str(
        "\nMedia:\n  <image:PATH_OR_URL>  attach an image\n  <video:PATH_OR_URL>  attach a video\n",
    );
    help.push_str(
        "\nPer-message flags (at the end of a line):\n  \
         --device D  --temperature T  --max-tokens N  --top-p P\n  \
         --sample / --no-sample  --option key=value\n",
    );
    help
}

pub(super) fn handle_help(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Handled(help_text())
}

pub(super) fn handle_reset(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    session.reset();
    CommandResult::Handled("Conversation cleared.".to_string())
}

pub(super) fn handle_history(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let history = session.history();
    let mut out = format!(
        "{} turn(s), {} message(s) with {}",
        session.turn_count(),
        history.len(),
        session.handler().model_id()
    );

    let skip = history.len().saturating_sub(HISTORY_PREVIEW);
    for message in history.turns().iter().skip(skip) {
        out.push('\n');
        out.push_str(&transcript_line(message.role(), &message.transcript_text()));
    }
    CommandResult::Handled(out)
}

pub(super) fn handle_dump(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let parts: Vec<&str> = invocation.args.split_whitespace().collect();

    let filename = match parts.as_slice() {
        [] => default_dump_filename(),
        [name] => name.to_string(),
        _ => return CommandResult::Handled("Usage: /dump [filename]".to_string()),
    };

    match dump_conversation(session, Path::new(&filename)) {
        Ok(()) => {
            info!(file = %filename, "conversation dumped");
            CommandResult::Handled(format!("Dumped: {filename}"))
        }
        Err(e) => CommandResult::Handled(format!("Dump error: {e}")),
    }
}

pub(super) fn handle_quit(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}

pub fn default_dump_filename() -> String {
    format!("qllama-log-{}.txt", Local::now().format("%Y-%m-%d"))
}

fn transcript_line(role: Role, text: &str) -> String {
    match role {
        Role::User => format!("You: {text}"),
        Role::Assistant => text.to_string(),
        Role::System => format!("System: {text}"),
    }
}

/// Writes the transcript, refusing to replace an existing file.
pub fn dump_conversation(
    session: &ChatSession,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = session.history();
    if history.is_empty() {
        return Err("No conversation to dump - the chat history is empty.".into());
    }

    if path.exists() {
        return Err(format!(
            "File '{}' already exists. Please specify a different filename with /dump <filename>.",
            path.display()
        )
        .into());
    }

    let file = File::create_new(path)?;
    let mut writer = BufWriter::new(file);

    for message in history.iter() {
        writeln!(
            writer,
            "{}",
            transcript_line(message.role(), &message.transcript_text())
        )?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests;
