//! JSON message schema for the `/ws/chat` channel.
//!
//! DESIGN
//! ======
//! Requests and events are internally tagged by `type`, matching the JSON the
//! backend already speaks. Plain chat messages are the one untagged shape, so
//! they get their own struct. Unknown inbound types decode to
//! [`ServerMessage::Unknown`] and are left for the caller to log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CodecError, de};

/// Assistant model selectable in the profile, journal and responder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GptModel {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
}

impl GptModel {
    /// Map a settings selector index to a model.
    ///
    /// Index `0` means "keep the current model" and maps to `None`.
    #[must_use]
    pub fn from_selector(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Gpt4o),
            2 => Some(Self::Gpt4oMini),
            _ => None,
        }
    }

    /// Parse the wire name used by the backend.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "gpt-4o" => Some(Self::Gpt4o),
            "gpt-4o-mini" => Some(Self::Gpt4oMini),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
        }
    }

    /// Human-readable label shown next to the model selector.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gpt4o => "GPT-4o",
            Self::Gpt4oMini => "GPT-4o-mini (Smaller and cheaper version)",
        }
    }

    /// Display label for a raw model name, falling back to the raw name.
    #[must_use]
    pub fn display_raw(raw: &str) -> &str {
        match Self::parse(raw) {
            Some(model) => model.display_name(),
            None => raw,
        }
    }
}

/// Chat message without attachments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainChat {
    pub message: String,
    #[serde(deserialize_with = "de::flag")]
    pub use_tools: bool,
    #[serde(deserialize_with = "de::flag")]
    pub extract_inputs: bool,
}

/// Typed client → server request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the next older page of chat history.
    LoadMoreChat {
        #[serde(deserialize_with = "de::u32_lenient")]
        chat_offset: u32,
    },
    /// Ask for the next older page of journal entries.
    LoadMoreJournals {
        #[serde(deserialize_with = "de::u32_lenient")]
        journals_offset: u32,
    },
    UserProfile,
    /// Replace the stored profile entries.
    UserProfileChange { profile: Vec<String> },
    UserProfileSettings {
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_for_profile_update: u32,
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_till_profile_update: u32,
        profiler_gpt_model: Option<GptModel>,
    },
    UserJournal,
    UserJournalSettings {
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_for_journal_update: u32,
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_till_journal_update: u32,
        journal_gpt_model: Option<GptModel>,
    },
    UserResponder,
    UserResponderSettings {
        responder_gpt_model: Option<GptModel>,
        responder_personality: String,
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_for_input_extraction: u32,
    },
    UserTransactions,
    /// Answer a tool's `input_request`.
    Inputs { tool: String, inputs: BTreeMap<String, String> },
}

/// Kind of toast the backend asks the client to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    #[serde(other)]
    Info,
}

/// One message of stored chat history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub is_bot: bool,
    pub message: String,
}

/// One emotional-journal card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: String,
    #[serde(deserialize_with = "de::u32_lenient")]
    pub updates_count: u32,
    /// JSON object of emotion name → score, encoded as a string.
    pub journal: String,
}

impl JournalEntry {
    /// Parse the journal scores, ordered by score descending, then by name.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if `journal` is not a JSON object of numbers.
    pub fn emotions(&self) -> Result<Vec<(String, f64)>, CodecError> {
        let scores: BTreeMap<String, f64> = serde_json::from_str(&self.journal)?;
        let mut emotions = scores.into_iter().collect::<Vec<_>>();
        emotions.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(emotions)
    }
}

/// One billing transaction row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: String,
    /// UTC timestamp without zone suffix, e.g. `2024-05-01T12:30:00`.
    pub datetime: String,
    #[serde(deserialize_with = "de::f64_lenient")]
    pub amount: f64,
}

/// Typed server → client event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionEstablished {
        #[serde(default)]
        message: String,
    },
    Notification {
        type_of_notification: NotificationKind,
        #[serde(default)]
        header: String,
        #[serde(default)]
        message: String,
    },
    UserProfile {
        /// JSON-encoded list of profile entries.
        profile: String,
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_for_profile_update: u32,
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_till_profile_update: u32,
        #[serde(default)]
        gpt_model: Option<String>,
    },
    UserJournal {
        /// `Some("load_more_journals")` for paged results.
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        journals: Vec<JournalEntry>,
        #[serde(default, deserialize_with = "de::opt_u32_lenient")]
        messages_for_journal_update: Option<u32>,
        #[serde(default, deserialize_with = "de::opt_u32_lenient")]
        messages_till_journal_update: Option<u32>,
        #[serde(default)]
        gpt_model: Option<String>,
    },
    UserResponder {
        #[serde(default)]
        gpt_model: Option<String>,
        #[serde(default)]
        responder_personality: String,
        #[serde(deserialize_with = "de::u32_lenient")]
        messages_for_input_extraction: u32,
    },
    UserTransactionsHistory {
        #[serde(default)]
        transactions: Vec<Transaction>,
    },
    LoadingResponse,
    UserMessage {
        user_message: String,
    },
    AiResponse {
        ai_message: String,
    },
    InputRequest {
        tool: String,
        #[serde(default)]
        inputs_description: String,
        #[serde(default)]
        missing_inputs: Vec<String>,
        #[serde(default)]
        found_inputs: BTreeMap<String, Value>,
    },
    ChatHistory {
        #[serde(default)]
        chat: Vec<HistoryEntry>,
    },
    MoreChatHistory {
        #[serde(default)]
        chat: Vec<HistoryEntry>,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Parse the JSON-encoded profile list of a `user_profile` event.
    ///
    /// Returns `None` for every other variant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if the profile string is not a JSON list of strings.
    pub fn profile_entries(&self) -> Option<Result<Vec<String>, CodecError>> {
        match self {
            Self::UserProfile { profile, .. } => {
                Some(serde_json::from_str(profile).map_err(CodecError::from))
            }
            _ => None,
        }
    }
}

/// A decoded client text frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientText {
    Chat(PlainChat),
    Request(ClientMessage),
}

/// Serialize a request into a text frame body.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_request(request: &ClientMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(request)?)
}

/// Decode an inbound server text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON or a known `type` with
/// missing or mistyped fields.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a client text frame the way the backend does: tagged requests
/// carry `type`, plain chat does not.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the text matches neither shape.
pub fn decode_client_text(text: &str) -> Result<ClientText, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("type").is_some() {
        Ok(ClientText::Request(serde_json::from_value(value)?))
    } else {
        Ok(ClientText::Chat(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
