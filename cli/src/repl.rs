//! Line commands for the interactive `chat` mode.
//!
//! Plain lines are chat messages. Lines starting with `/` are commands;
//! `//text` sends `/text` as a message.

use std::path::PathBuf;

use client::state::compose::ToolFlags;
use frames::GptModel;

pub const HELP: &str = "\
commands:
  <text>                              send a chat message
  /audio <path>  /image <path>        attach a file to the next message
  /cancel audio|image                 drop a pending attachment
  /tools  /extract                    toggle use_tools / extract_inputs
  /more                               load older chat history
  /profile                            show the profile
  /profile add <text>                 add a profile entry
  /profile edit <n> <text>            replace entry n (1-based)
  /profile save                       save profile entries
  /profile settings <for> <till> [model]
  /journal  /journal more             show journals / load older ones
  /journal settings <for> <till> [model]
  /responder                          show responder settings
  /responder personality <text>
  /responder settings <messages> [model]
  /usage                              show transaction history
  /input <name> <value>               fill a requested tool input
  /send-inputs  /cancel-inputs        answer or dismiss the input request
  /theme  /balance  /topup <amount>
  /help  /quit
models: 0 keeps the current model, 1 = gpt-4o, 2 = gpt-4o-mini";

#[derive(Clone, Debug, PartialEq)]
pub enum ReplCommand {
    Chat(String),
    AttachAudio(PathBuf),
    AttachImage(PathBuf),
    CancelAudio,
    CancelImage,
    ToggleTools,
    ToggleExtract,
    MoreChat,
    Profile,
    ProfileAdd(String),
    ProfileEdit { index: usize, text: String },
    ProfileSave,
    ProfileSettings { for_update: u32, till_update: u32, model: Option<GptModel> },
    Journal,
    MoreJournals,
    JournalSettings { for_update: u32, till_update: u32, model: Option<GptModel> },
    Responder,
    ResponderPersonality(String),
    ResponderSettings { messages: u32, model: Option<GptModel> },
    Usage,
    SetInput { name: String, value: String },
    SendInputs,
    CancelInputs,
    Theme,
    Balance,
    TopUp(f64),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command `/{0}`; try /help")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line.
///
/// # Errors
///
/// Returns [`ParseError::Empty`] for blank lines and a usage error for
/// malformed commands.
pub fn parse(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Chat(line.to_owned()));
    };
    if command.starts_with('/') {
        return Ok(ReplCommand::Chat(command.to_owned()));
    }

    let (name, rest) = split_word(command);
    match name {
        "audio" => path_arg(rest, "/audio <path>").map(ReplCommand::AttachAudio),
        "image" => path_arg(rest, "/image <path>").map(ReplCommand::AttachImage),
        "cancel" => match rest {
            "audio" => Ok(ReplCommand::CancelAudio),
            "image" => Ok(ReplCommand::CancelImage),
            _ => Err(ParseError::Usage("/cancel audio|image")),
        },
        "tools" => Ok(ReplCommand::ToggleTools),
        "extract" => Ok(ReplCommand::ToggleExtract),
        "more" => Ok(ReplCommand::MoreChat),
        "profile" => parse_profile(rest),
        "journal" => parse_journal(rest),
        "responder" => parse_responder(rest),
        "usage" => Ok(ReplCommand::Usage),
        "input" => {
            let (name, value) = split_word(rest);
            if name.is_empty() {
                return Err(ParseError::Usage("/input <name> <value>"));
            }
            Ok(ReplCommand::SetInput { name: name.to_owned(), value: value.to_owned() })
        }
        "send-inputs" => Ok(ReplCommand::SendInputs),
        "cancel-inputs" => Ok(ReplCommand::CancelInputs),
        "theme" => Ok(ReplCommand::Theme),
        "balance" => Ok(ReplCommand::Balance),
        "topup" => rest
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .map(ReplCommand::TopUp)
            .ok_or(ParseError::Usage("/topup <amount>")),
        "help" => Ok(ReplCommand::Help),
        "quit" | "exit" => Ok(ReplCommand::Quit),
        other => Err(ParseError::Unknown(other.to_owned())),
    }
}

/// Apply a `/tools` or `/extract` toggle.
///
/// Returns the reason when the toggle is locked by the other flag. Other
/// commands leave the flags alone.
pub fn toggle_flag(flags: &mut ToolFlags, command: &ReplCommand) -> Result<(), &'static str> {
    match command {
        ReplCommand::ToggleTools if !flags.toggle_use_tools() => {
            Err("use_tools stays on while extract_inputs is on")
        }
        ReplCommand::ToggleExtract if !flags.toggle_extract_inputs() => {
            Err("extract_inputs needs use_tools; run /tools first")
        }
        _ => Ok(()),
    }
}

fn parse_profile(rest: &str) -> Result<ReplCommand, ParseError> {
    let (sub, args) = split_word(rest);
    match sub {
        "" => Ok(ReplCommand::Profile),
        "add" if !args.is_empty() => Ok(ReplCommand::ProfileAdd(args.to_owned())),
        "edit" => {
            let (index, text) = split_word(args);
            match index.parse::<usize>() {
                Ok(index) if index > 0 => Ok(ReplCommand::ProfileEdit { index, text: text.to_owned() }),
                _ => Err(ParseError::Usage("/profile edit <n> <text>")),
            }
        }
        "save" => Ok(ReplCommand::ProfileSave),
        "settings" => {
            let (for_update, till_update, model) =
                settings_args(args, "/profile settings <for> <till> [model]")?;
            Ok(ReplCommand::ProfileSettings { for_update, till_update, model })
        }
        _ => Err(ParseError::Usage("/profile [add <text> | edit <n> <text> | save | settings ...]")),
    }
}

fn parse_journal(rest: &str) -> Result<ReplCommand, ParseError> {
    let (sub, args) = split_word(rest);
    match sub {
        "" => Ok(ReplCommand::Journal),
        "more" => Ok(ReplCommand::MoreJournals),
        "settings" => {
            let (for_update, till_update, model) =
                settings_args(args, "/journal settings <for> <till> [model]")?;
            Ok(ReplCommand::JournalSettings { for_update, till_update, model })
        }
        _ => Err(ParseError::Usage("/journal [more | settings ...]")),
    }
}

fn parse_responder(rest: &str) -> Result<ReplCommand, ParseError> {
    let (sub, args) = split_word(rest);
    match sub {
        "" => Ok(ReplCommand::Responder),
        "personality" => Ok(ReplCommand::ResponderPersonality(args.to_owned())),
        "settings" => {
            const USAGE: &str = "/responder settings <messages> [model]";
            let mut words = args.split_whitespace();
            let messages = words
                .next()
                .and_then(|raw| raw.parse().ok())
                .ok_or(ParseError::Usage(USAGE))?;
            let model = model_arg(words.next(), USAGE)?;
            Ok(ReplCommand::ResponderSettings { messages, model })
        }
        _ => Err(ParseError::Usage("/responder [personality <text> | settings ...]")),
    }
}

fn settings_args(args: &str, usage: &'static str) -> Result<(u32, u32, Option<GptModel>), ParseError> {
    let mut words = args.split_whitespace();
    let mut number = || words.next().and_then(|raw| raw.parse::<u32>().ok()).ok_or(ParseError::Usage(usage));
    let for_update = number()?;
    let till_update = number()?;
    let model = model_arg(words.next(), usage)?;
    Ok((for_update, till_update, model))
}

/// `0`/missing keeps the current model; `1`/`2` or a wire name selects one.
fn model_arg(raw: Option<&str>, usage: &'static str) -> Result<Option<GptModel>, ParseError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(index) = raw.parse::<u8>() {
        return match index {
            0 => Ok(None),
            _ => GptModel::from_selector(index).map(Some).ok_or(ParseError::Usage(usage)),
        };
    }
    GptModel::parse(raw).map(Some).ok_or(ParseError::Usage(usage))
}

fn path_arg(rest: &str, usage: &'static str) -> Result<PathBuf, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok(PathBuf::from(rest))
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;
