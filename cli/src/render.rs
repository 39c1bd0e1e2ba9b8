//! Plain-text rendering of client state for the terminal.

use std::fmt::Write as _;

use client::state::attachments::AttachmentDraft;
use client::state::chat::{Author, ChatMessage, InputForm};
use client::state::compose::ToolFlags;
use client::state::notifications::{Toast, ToastKind};
use client::state::pager::HistoryPager;
use client::state::panels::{
    JournalPanel, NO_PROFILE_TEXT, ProfilePanel, ResponderPanel, TransactionsPanel, selected_model_label,
};
use client::util::theme::Theme;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const RESET: &str = "\x1b[0m";

/// ANSI color prefixes for one theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    bot: &'static str,
    user: &'static str,
    alert: &'static str,
    reset: &'static str,
}

impl Palette {
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self { bot: "\x1b[34m", user: "\x1b[32m", alert: "\x1b[31m", reset: RESET },
            Theme::Dark => Self { bot: "\x1b[96m", user: "\x1b[92m", alert: "\x1b[93m", reset: RESET },
        }
    }

    /// No escape codes.
    #[must_use]
    pub fn plain() -> Self {
        Self { bot: "", user: "", alert: "", reset: "" }
    }
}

pub fn message(palette: &Palette, message: &ChatMessage) -> String {
    let (color, who) = match message.author {
        Author::Bot => (palette.bot, "bot"),
        Author::User => (palette.user, "you"),
    };
    format!("{color}{who}{}: {}", palette.reset, markdown_text(&message.text))
}

/// Flatten markdown to terminal text. Raw HTML is dropped.
pub fn markdown_text(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::Start(Tag::Image { dest_url, .. }) => {
                let _ = write!(out, "[image {dest_url}] ");
            }
            Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
            Event::End(TagEnd::TableCell) => out.push_str(" | "),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) => out.push('\n'),
            _ => {}
        }
    }
    out.trim_end().to_owned()
}

pub fn older_messages(palette: &Palette, messages: &[ChatMessage]) -> String {
    let mut out = String::from("--- older messages ---");
    for entry in messages {
        out.push('\n');
        out.push_str(&message(palette, entry));
    }
    out
}

pub fn profile(panel: &ProfilePanel) -> String {
    let mut out = String::from("profile:");
    if panel.entries.is_empty() {
        let _ = write!(out, "\n  {NO_PROFILE_TEXT}");
    }
    for (index, entry) in panel.entries.iter().enumerate() {
        let _ = write!(out, "\n  {}. {entry}", index + 1);
    }
    let _ = write!(
        out,
        "\n  update after {} messages, {} until next update\n  {}",
        panel.messages_for_update,
        panel.messages_till_update,
        selected_model_label(panel.current_model.as_deref()),
    );
    out
}

pub fn journal(panel: &JournalPanel) -> String {
    let mut out = String::from("journal:");
    for entry in &panel.entries {
        let _ = write!(out, "\n  Date: {}  Updates count: {}", entry.date, entry.updates_count);
        match entry.emotions() {
            Ok(emotions) => {
                for (emotion, score) in emotions {
                    let _ = write!(out, "\n    {emotion:<16} {score}");
                }
            }
            Err(error) => {
                let _ = write!(out, "\n    (unreadable journal: {error})");
            }
        }
    }
    let _ = write!(
        out,
        "\n  update after {} messages, {} until next update\n  {}",
        panel.messages_for_update,
        panel.messages_till_update,
        selected_model_label(panel.current_model.as_deref()),
    );
    out
}

pub fn responder(panel: &ResponderPanel) -> String {
    format!(
        "responder:\n  personality: {}\n  messages for input extraction: {}\n  {}",
        panel.personality,
        panel.messages_for_input_extraction,
        selected_model_label(panel.current_model.as_deref()),
    )
}

pub fn transactions(panel: &TransactionsPanel) -> String {
    let mut out = String::from("usage:");
    for row in &panel.rows {
        let _ = write!(out, "\n  Type: {}  Date and time: {}  Amount: {}", row.kind, row.datetime, row.amount);
    }
    out
}

pub fn input_form(form: &InputForm) -> String {
    let mut out = format!("{}\n{}", form.heading, form.description);
    for field in &form.fields {
        let required = if field.required { " [required]" } else { "" };
        let _ = write!(out, "\n  {} ({}){required}: {}", field.label, field.name, field.value);
    }
    out.push_str("\nfill with /input <name> <value>, then /send-inputs or /cancel-inputs");
    out
}

pub fn toast(palette: &Palette, toast: &Toast) -> String {
    let marker = match toast.kind {
        ToastKind::Error => "!",
        ToastKind::Success => "+",
        ToastKind::Info => "i",
    };
    format!("{}[{marker}] {}{}: {}", palette.alert, toast.header, palette.reset, toast.message)
}

/// One-line paging state for `what` ("messages", "journals").
pub fn paging_status(pager: &HistoryPager, what: &str) -> Option<String> {
    if pager.is_exhausted() {
        Some(format!("--- no older {what} ---"))
    } else if pager.is_loading() {
        Some(format!("loading older {what}..."))
    } else {
        None
    }
}

pub fn compose_status(flags: ToolFlags, draft: &AttachmentDraft) -> String {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    let mut attached = Vec::new();
    if let Some(audio) = draft.audio() {
        attached.push(format!("audio ({} bytes)", audio.len()));
    }
    if let Some(image) = draft.image() {
        attached.push(format!("image {} ({} bytes)", image.mime_type, image.bytes.len()));
    }
    let attached = if attached.is_empty() { "none".to_owned() } else { attached.join(", ") };
    format!(
        "use_tools: {}  extract_inputs: {}  attachments: {attached}",
        on_off(flags.use_tools()),
        on_off(flags.extract_inputs()),
    )
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
