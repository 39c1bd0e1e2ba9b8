//! Profile, journal, responder and usage panels.
//!
//! Each panel mirrors the last matching server event and builds the
//! settings request for its "save" action. Slider fields hold the values
//! that will be sent; the backend values overwrite them on every load.

use frames::{ClientMessage, GptModel, JournalEntry, Transaction};

/// Shown when the profile has no entries.
pub const NO_PROFILE_TEXT: &str = "No entries in the profile";

/// `Selected: <model>` label shown next to a model selector.
#[must_use]
pub fn selected_model_label(model: Option<&str>) -> String {
    format!("Selected: {}", model.map_or("default", GptModel::display_raw))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfilePanel {
    pub entries: Vec<String>,
    pub messages_for_update: u32,
    pub messages_till_update: u32,
    pub current_model: Option<String>,
}

impl ProfilePanel {
    pub fn apply(
        &mut self,
        entries: Vec<String>,
        messages_for_update: u32,
        messages_till_update: u32,
        gpt_model: Option<String>,
    ) {
        self.entries = entries;
        self.messages_for_update = messages_for_update;
        self.messages_till_update = messages_till_update;
        self.current_model = gpt_model;
    }

    /// Add an empty entry for the user to fill in.
    pub fn add_entry(&mut self) {
        self.entries.push(String::new());
    }

    /// `user_profile_change` with every non-empty entry.
    #[must_use]
    pub fn change_request(&self) -> ClientMessage {
        let profile = self.entries.iter().filter(|entry| !entry.is_empty()).cloned().collect();
        ClientMessage::UserProfileChange { profile }
    }

    /// `user_profile_settings`; `model` of `None` keeps the current model.
    #[must_use]
    pub fn settings_request(&self, model: Option<GptModel>) -> ClientMessage {
        ClientMessage::UserProfileSettings {
            messages_for_profile_update: self.messages_for_update,
            messages_till_profile_update: self.messages_till_update,
            profiler_gpt_model: model,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JournalPanel {
    /// Oldest first.
    pub entries: Vec<JournalEntry>,
    pub messages_for_update: u32,
    pub messages_till_update: u32,
    pub current_model: Option<String>,
}

impl JournalPanel {
    /// Apply a full `user_journal` load. Settings absent from the event keep
    /// their current values.
    pub fn apply(
        &mut self,
        journals: Vec<JournalEntry>,
        messages_for_update: Option<u32>,
        messages_till_update: Option<u32>,
        gpt_model: Option<String>,
    ) {
        self.entries = journals;
        if let Some(value) = messages_for_update {
            self.messages_for_update = value;
        }
        if let Some(value) = messages_till_update {
            self.messages_till_update = value;
        }
        self.current_model = gpt_model;
    }

    /// Prepend an older page, keeping the page's own order.
    pub fn prepend(&mut self, journals: Vec<JournalEntry>) {
        self.entries.splice(0..0, journals);
    }

    #[must_use]
    pub fn settings_request(&self, model: Option<GptModel>) -> ClientMessage {
        ClientMessage::UserJournalSettings {
            messages_for_journal_update: self.messages_for_update,
            messages_till_journal_update: self.messages_till_update,
            journal_gpt_model: model,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponderPanel {
    pub current_model: Option<String>,
    pub personality: String,
    pub messages_for_input_extraction: u32,
}

impl ResponderPanel {
    pub fn apply(&mut self, gpt_model: Option<String>, personality: String, messages_for_input_extraction: u32) {
        self.current_model = gpt_model;
        self.personality = personality;
        self.messages_for_input_extraction = messages_for_input_extraction;
    }

    #[must_use]
    pub fn settings_request(&self, model: Option<GptModel>) -> ClientMessage {
        ClientMessage::UserResponderSettings {
            responder_gpt_model: model,
            responder_personality: self.personality.clone(),
            messages_for_input_extraction: self.messages_for_input_extraction,
        }
    }
}

/// One usage row, formatted for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRow {
    pub kind: String,
    pub datetime: String,
    pub amount: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.kind.clone(),
            datetime: format_utc_datetime(&transaction.datetime),
            amount: format_amount(transaction.amount),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionsPanel {
    pub rows: Vec<TransactionRow>,
}

impl TransactionsPanel {
    pub fn apply(&mut self, transactions: &[Transaction]) {
        self.rows = transactions.iter().map(TransactionRow::from).collect();
    }
}

/// Amount label; costs that round to zero are shown as `< 0.0001$`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 {
        "< 0.0001$".to_owned()
    } else {
        format!("{amount}$")
    }
}

/// Render a zone-less UTC timestamp (`2024-05-01T12:30:00.123`) as
/// `2024-05-01 12:30:00 UTC`. Unrecognized input is returned as-is.
#[must_use]
pub fn format_utc_datetime(raw: &str) -> String {
    let Some((date, time)) = raw.split_once('T') else {
        return raw.to_owned();
    };
    let time = time.trim_end_matches('Z');
    let seconds = time.get(..8).unwrap_or(time);
    format!("{date} {seconds} UTC")
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Panels {
    pub profile: ProfilePanel,
    pub journal: JournalPanel,
    pub responder: ResponderPanel,
    pub transactions: TransactionsPanel,
}

#[cfg(test)]
#[path = "panels_test.rs"]
mod tests;
