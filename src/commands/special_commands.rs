//! Special commands parser for the interactive session
//!
//! Special commands let the user switch views, browse and resume saved
//! conversations, start over, pick a starter question, and leave the
//! session. They are prefixed with `/` and are case-insensitive; arguments
//! keep their original case.

use crate::view_mode::ViewMode;
use thiserror::Error;

/// Starter questions offered while a conversation holds only the welcome
/// message, as (category, question)
pub const QUICK_QUESTIONS: [(&str, &str); 6] = [
    ("Location", "What are the best schools near me?"),
    ("Quality", "Which schools have Outstanding Ofsted ratings?"),
    ("Admissions", "What are the admission requirements for top schools?"),
    ("Environment", "Which schools have the smallest class sizes?"),
    ("Guidance", "How do I compare schools effectively?"),
    ("Activities", "What extracurricular activities are available?"),
];

/// Quick question by its 1-based number
pub fn quick_question(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| QUICK_QUESTIONS.get(i))
        .map(|(_, question)| *question)
}

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

/// Special commands that can be executed during a session
///
/// These commands change session state or show information rather than
/// being sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch to the other view mode
    ToggleMode,

    /// Switch to a specific view mode
    SwitchMode(ViewMode),

    /// List saved conversations, optionally filtered by a search query
    History(Option<String>),

    /// Resume a saved conversation by id
    Resume(String),

    /// Start a new conversation
    NewConversation,

    /// List the quick-start questions
    Questions,

    /// Ask quick-start question number N (1-based)
    QuickQuestion(usize),

    /// Display current mode and conversation status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be processed as a regular message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, `CommandError::UnsupportedArgument` for invalid
/// arguments, and `CommandError::MissingArgument` when a required argument
/// is absent.
///
/// # Examples
///
/// ```
/// use schoolfinder::commands::special_commands::{parse_special_command, SpecialCommand};
/// use schoolfinder::view_mode::ViewMode;
///
/// let cmd = parse_special_command("/mode classic").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchMode(ViewMode::Classic));
///
/// let cmd = parse_special_command("Which schools are near me?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match lower.split_once(char::is_whitespace) {
        Some((name, _)) => (name.to_string(), trimmed[name.len()..].trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/toggle" | "/switch" => Ok(SpecialCommand::ToggleMode),
        "/assistant" | "/chat" => Ok(SpecialCommand::SwitchMode(ViewMode::Assistant)),
        "/classic" => Ok(SpecialCommand::SwitchMode(ViewMode::Classic)),

        "/mode" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/mode".to_string(),
            usage: "/mode <assistant|classic>".to_string(),
        }),
        "/mode" => ViewMode::parse_str(arg)
            .map(SpecialCommand::SwitchMode)
            .map_err(|_| CommandError::UnsupportedArgument {
                command: "/mode".to_string(),
                arg: arg.to_string(),
            }),

        "/history" if arg.is_empty() => Ok(SpecialCommand::History(None)),
        "/history" => Ok(SpecialCommand::History(Some(arg.to_string()))),

        "/resume" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/resume".to_string(),
            usage: "/resume <conversation_id>".to_string(),
        }),
        "/resume" => Ok(SpecialCommand::Resume(arg.to_string())),

        "/new" | "/reset" => Ok(SpecialCommand::NewConversation),

        "/questions" | "/q" if arg.is_empty() => Ok(SpecialCommand::Questions),
        "/questions" | "/q" => match arg.parse::<usize>() {
            Ok(n) if quick_question(n).is_some() => Ok(SpecialCommand::QuickQuestion(n)),
            _ => Err(CommandError::UnsupportedArgument {
                command: "/questions".to_string(),
                arg: arg.to_string(),
            }),
        },
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands
================

VIEW MODE:
  /toggle             - Switch between assistant and classic views
  /mode <name>        - Switch to a view: assistant or classic
  /assistant          - Shorthand for /mode assistant
  /classic            - Shorthand for /mode classic

CHAT HISTORY:
  /history [query]    - List saved conversations (filter by title/preview)
  /resume <id>        - Continue a saved conversation
  /new                - Start a new conversation

QUICK START:
  /questions          - List starter questions
  /questions <n>      - Ask starter question number n

SESSION:
  /status             - Show current view and conversation
  /help               - Show this help message
  /exit, exit, quit   - Leave SchoolFinder

Anything else is sent to the assistant as a question.
"#
    );
}
