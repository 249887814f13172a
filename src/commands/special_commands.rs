//! Special commands parser for interactive chat mode
//!
//! Special commands manage sessions and attachments instead of being sent
//! to the model. They are prefixed with `/` and are case-insensitive
//! (arguments such as file paths keep their case).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new session and make it active
    NewSession,

    /// List sessions, most recent first
    ListSessions,

    /// Make the session with this 1-based list number active
    Switch(usize),

    /// Delete the session with this 1-based list number, or the active one
    Delete(Option<usize>),

    /// Attach a PDF to the next message
    Attach(PathBuf),

    /// Show the active session and pending attachment
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` commands,
/// `CommandError::MissingArgument` when a required argument is absent, and
/// `CommandError::UnsupportedArgument` when a session number is not a
/// positive integer.
///
/// # Examples
///
/// ```
/// use parley::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewSession);
/// assert_eq!(parse_special_command("/switch 2").unwrap(), SpecialCommand::Switch(2));
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/new" => Ok(SpecialCommand::NewSession),
        "/sessions" | "/list" => Ok(SpecialCommand::ListSessions),

        "/switch" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/switch".to_string(),
                    usage: "/switch <number>".to_string(),
                });
            }
            parse_session_number("/switch", arg).map(SpecialCommand::Switch)
        }

        "/delete" => {
            if arg.is_empty() {
                Ok(SpecialCommand::Delete(None))
            } else {
                parse_session_number("/delete", arg).map(|n| SpecialCommand::Delete(Some(n)))
            }
        }

        "/attach" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/attach".to_string(),
                    usage: "/attach <path-to-pdf>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Attach(PathBuf::from(arg)))
            }
        }

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn parse_session_number(command: &str, arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSIONS:
  /new            - Start a new chat session
  /sessions       - List sessions (most recent first)
  /list           - Same as /sessions
  /switch <n>     - Switch to session number <n> from the list
  /delete [n]     - Delete session <n>, or the current session

DOCUMENTS:
  /attach <path>  - Attach a PDF; its text is sent with your next message

SESSION INFORMATION:
  /status         - Show the current session and pending attachment
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - An attached document is used for one message only
  - An empty line sends a pending attachment on its own
"#
    );
}
