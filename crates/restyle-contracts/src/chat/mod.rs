mod command_parser;

pub use command_parser::{parse_command, SessionCommand, SESSION_HELP_COMMANDS};
