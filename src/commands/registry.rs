use super::CommandResult;
use crate::core::session::ChatSession;

pub type CommandHandler = fn(&mut ChatSession, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show commands, flags and the media tag syntax.",
        handler: super::handle_help,
    },
    Command {
        name: "reset",
        usage: "/reset",
        help: "Forget the conversation; the model stays loaded.",
        handler: super::handle_reset,
    },
    Command {
        name: "history",
        usage: "/history",
        help: "Show the turn count and the most recent messages.",
        handler: super::handle_history,
    },
    Command {
        name: "dump",
        usage: "/dump [file]",
        help: "Write the conversation to a text file.",
        handler: super::handle_dump,
    },
    Command {
        name: "exit",
        usage: "/exit",
        help: "Leave the session (also: exit, quit, Ctrl-D).",
        handler: super::handle_quit,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Same as /exit.",
        handler: super::handle_quit,
    },
];
