//! Prompt commands.
//!
//! Rows are addressed by their 1-based position on the screen.

use std::str::FromStr;
use thiserror::Error;

/// Something the user asked for at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `add <text>`
    Add(String),
    /// `toggle <n>`
    Toggle(usize),
    /// `edit <n>`: enter edit mode for a row
    StartEdit(usize),
    /// `draft <text>`: replace the draft of the row being edited
    UpdateDraft(String),
    /// `save`
    SaveEdit,
    /// `cancel`
    CancelEdit,
    /// `rm <n>`
    Delete(usize),
    /// `refresh`
    Refresh,
    /// `dismiss`: clear the error banner
    DismissError,
    /// `quit`
    Quit,
}

/// Input that is not a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIntentError {
    /// Blank line
    #[error("Type a command (add, toggle, edit, draft, save, cancel, rm, refresh, dismiss, quit)")]
    Empty,
    /// Unknown verb
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    /// Verb needs an argument
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    /// Row number is not a positive integer
    #[error("Not a row number: {0}")]
    InvalidIndex(String),
}

fn index(command: &'static str, arg: &str) -> Result<usize, ParseIntentError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ParseIntentError::MissingArgument(command));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseIntentError::InvalidIndex(arg.to_string())),
    }
}

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command.trim_end() {
            "" => Err(ParseIntentError::Empty),
            // Text is sent as typed; only the separating space is dropped.
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "draft" | "d" => Ok(Self::UpdateDraft(rest.to_string())),
            "toggle" | "t" => index("toggle", rest).map(Self::Toggle),
            "edit" | "e" => index("edit", rest).map(Self::StartEdit),
            "rm" | "delete" => index("rm", rest).map(Self::Delete),
            "save" => Ok(Self::SaveEdit),
            "cancel" => Ok(Self::CancelEdit),
            "refresh" | "r" => Ok(Self::Refresh),
            "dismiss" => Ok(Self::DismissError),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(ParseIntentError::UnknownCommand(other.to_string())),
        }
    }
}
