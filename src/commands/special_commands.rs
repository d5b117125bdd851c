//! Special commands parser for interactive chat mode
//!
//! Special commands are handled locally and never sent to the backend.
//! They are prefixed with `/` and are case-insensitive; `exit` and `quit`
//! also work without the slash. A line starting with `//` is a question
//! that itself starts with `/`; one slash is stripped before sending.

use colored::Colorize;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show session id, chat endpoint, state, and transcript size
    ShowStatus,

    /// Show the active slide of every rotation
    ShowSlides,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input to the backend
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if the input starts with `/` but
/// names no known command
///
/// # Examples
///
/// ```
/// use sitechat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/STATUS").unwrap(), SpecialCommand::ShowStatus);
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("Où est le campus ?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if trimmed.starts_with("//") {
        return Ok(SpecialCommand::None);
    }
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/slides" => Ok(SpecialCommand::ShowSlides),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Text to send for a line that is not a special command
///
/// Strips the escape slash from `//...` lines.
///
/// # Examples
///
/// ```
/// use sitechat::commands::special_commands::message_text;
///
/// assert_eq!(message_text("//etc/hosts ?"), "/etc/hosts ?");
/// assert_eq!(message_text("Bonjour"), "Bonjour");
/// ```
pub fn message_text(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.starts_with("//") {
        &trimmed[1..]
    } else {
        input
    }
}

/// The help listing shown by `/help`
pub fn help_text() -> String {
    format!(
        "\n{}\n\
         \x20 /status   Show session id, chat endpoint, state, and message count\n\
         \x20 /slides   Show the active slide of each rotator\n\
         \x20 /help     Show this help\n\
         \x20 /exit     Leave the chat (also: exit, quit)\n\
         \n\
         Anything else is sent to the assistant. A line starting with an\n\
         unknown /command is not sent; start it with // to send a question\n\
         that begins with /.\n",
        "Available commands".bold()
    )
}

/// Print the list of special commands
pub fn print_help() {
    println!("{}", help_text());
}
