//! User intents parsed from terminal input lines.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Upload(PathBuf),
    Status,
    History,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  <question>       ask about the uploaded document
  /upload <path>   ingest a document
  /status          show upload and query state
  /history         reprint the transcript
  /help            show this help
  /quit            wait for outstanding requests and exit";

/// Returns `None` for lines that carry no intent (blank input).
///
/// Unknown slash commands are treated as questions so nothing typed is lost.
pub fn parse_line(line: &str) -> Option<ChatCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Some(ChatCommand::Ask(line.trim_end_matches(['\r', '\n']).to_string()));
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "upload" | "u" if !arg.is_empty() => ChatCommand::Upload(PathBuf::from(unquote(arg))),
        "upload" | "u" => ChatCommand::Help,
        "status" => ChatCommand::Status,
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Ask(trimmed.to_string()),
    };
    Some(command)
}

fn unquote(arg: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    arg
}
