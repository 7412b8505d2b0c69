//! Terminal front-end: command parsing, output formatting and the REPL.

pub mod command;
pub mod formatter;
pub mod repl;

pub use command::{Command, CommandParseError, ConversationRef, parse_command};
pub use formatter::MessageFormatter;
pub use repl::Repl;
