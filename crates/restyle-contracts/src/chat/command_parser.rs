use std::path::PathBuf;

use crate::image::ImageRole;

pub const SESSION_HELP_COMMANDS: &[&str] = &[
    "/input <path>",
    "/concept <path>",
    "/drop <input|concept> <path> [mime]",
    "/generate",
    "/status",
    "/save <path>",
    "/help",
    "/quit",
];

/// One parsed line of the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Noop,
    Help,
    Quit,
    Status,
    Generate,
    /// File picker path: the type is declared from the extension.
    Pick { role: ImageRole, path: PathBuf },
    /// Dropped file: the adapter may hand over the type it was given.
    Drop {
        role: ImageRole,
        path: PathBuf,
        mime_type: Option<String>,
    },
    Save { path: PathBuf },
    Invalid { command: String, reason: String },
    Unknown { command: String, arg: String },
}

fn split_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg.split_whitespace().map(str::to_string).collect(),
    }
}

fn single_path(command: &str, arg: &str) -> Result<PathBuf, SessionCommand> {
    let parts = split_args(arg);
    if parts.is_empty() {
        return Err(SessionCommand::Invalid {
            command: command.to_string(),
            reason: format!("/{command} requires a path"),
        });
    }
    Ok(PathBuf::from(parts.join(" ")))
}

fn parse_drop(arg: &str) -> SessionCommand {
    let mut parts = split_args(arg).into_iter();
    let invalid = |reason: String| SessionCommand::Invalid {
        command: "drop".to_string(),
        reason,
    };
    let Some(role) = parts.next() else {
        return invalid("/drop requires a role and a path".to_string());
    };
    let role = match role.parse::<ImageRole>() {
        Ok(role) => role,
        Err(reason) => return invalid(reason),
    };
    let Some(path) = parts.next() else {
        return invalid("/drop requires a path".to_string());
    };
    SessionCommand::Drop {
        role,
        path: PathBuf::from(path),
        mime_type: parts.next(),
    }
}

pub fn parse_command(text: &str) -> SessionCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return SessionCommand::Noop;
    }

    let Some(tail) = trimmed.strip_prefix('/') else {
        return SessionCommand::Unknown {
            command: String::new(),
            arg: trimmed.to_string(),
        };
    };
    let command_len = tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    let command = tail[..command_len].to_ascii_lowercase();
    let arg = tail[command_len..].trim();

    let path_command = |role: ImageRole| match single_path(&command, arg) {
        Ok(path) => SessionCommand::Pick { role, path },
        Err(invalid) => invalid,
    };

    match command.as_str() {
        "help" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        "status" => SessionCommand::Status,
        "generate" | "go" => SessionCommand::Generate,
        "input" | "content" => path_command(ImageRole::Input),
        "concept" | "style" => path_command(ImageRole::Concept),
        "drop" => parse_drop(arg),
        "save" => match single_path(&command, arg) {
            Ok(path) => SessionCommand::Save { path },
            Err(invalid) => invalid,
        },
        _ => SessionCommand::Unknown {
            command: command.clone(),
            arg: arg.to_string(),
        },
    }
}
