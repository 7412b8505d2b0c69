//! REPL command parsing.

use thiserror::Error;

use crate::domain::PublicId;

/// A conversation reference: position in the displayed list (1-based) or id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationRef {
    Index(usize),
    Id(PublicId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Option<String>),
    Logout,
    Profile,
    List,
    Open(ConversationRef),
    New(PublicId),
    Delete(ConversationRef),
    Search(String),
    /// Start a conversation with the n-th search result (1-based)
    Pick(usize),
    Help,
    Quit,
    /// Plain text sent to the selected conversation
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Unknown command '/{0}', type /help for the list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid user id '{0}'")]
    InvalidId(String),
}

fn parse_conversation_ref(
    argument: &str,
    usage: &'static str,
) -> Result<ConversationRef, CommandParseError> {
    if argument.is_empty() {
        return Err(CommandParseError::Usage(usage));
    }
    if let Ok(index) = argument.parse::<usize>() {
        return if index == 0 {
            Err(CommandParseError::Usage(usage))
        } else {
            Ok(ConversationRef::Index(index))
        };
    }
    argument
        .parse()
        .map(ConversationRef::Id)
        .map_err(|_| CommandParseError::Usage(usage))
}

/// Parse one input line (already trimmed by the line editor)
pub fn parse_command(line: &str) -> Result<Command, CommandParseError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };

    match name {
        "login" => Ok(Command::Login(
            (!argument.is_empty()).then(|| argument.to_string()),
        )),
        "logout" => Ok(Command::Logout),
        "profile" => Ok(Command::Profile),
        "list" => Ok(Command::List),
        "open" => parse_conversation_ref(argument, "/open <n|uuid>").map(Command::Open),
        "delete" => parse_conversation_ref(argument, "/delete <n|uuid>").map(Command::Delete),
        "new" => {
            if argument.is_empty() {
                return Err(CommandParseError::Usage("/new <user-uuid>"));
            }
            argument
                .parse()
                .map(Command::New)
                .map_err(|_| CommandParseError::InvalidId(argument.to_string()))
        }
        "search" => {
            if argument.is_empty() {
                Err(CommandParseError::Usage("/search <text>"))
            } else {
                Ok(Command::Search(argument.to_string()))
            }
        }
        "pick" => match argument.parse::<usize>() {
            Ok(index) if index > 0 => Ok(Command::Pick(index)),
            _ => Err(CommandParseError::Usage("/pick <n>")),
        },
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandParseError::Unknown(other.to_string())),
    }
}
