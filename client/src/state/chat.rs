//! Chat transcript and the pending tool-inputs form.
//!
//! DESIGN
//! ======
//! The transcript is append-mostly: live messages go to the bottom, older
//! history pages are inserted at the top. While a response is being
//! generated a bot placeholder holds its slot; the first placeholder is
//! removed when the answer arrives or the inputs form is resolved.

use std::collections::BTreeMap;

use frames::{ClientMessage, HistoryEntry};
use serde_json::Value;

use crate::error::ClientError;

/// Text of the bot placeholder shown while a response is generated.
pub const PLACEHOLDER_TEXT: &str = "...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

impl Author {
    fn from_is_bot(is_bot: bool) -> Self {
        if is_bot { Self::Bot } else { Self::User }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Author,
    /// Markdown text as sent by the backend.
    pub text: String,
    /// `true` for the loading placeholder.
    pub placeholder: bool,
}

impl ChatMessage {
    fn new(author: Author, text: impl Into<String>) -> Self {
        Self { author, text: text.into(), placeholder: false }
    }
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        Self::new(Author::from_is_bot(entry.is_bot), entry.message)
    }
}

/// One field of an inputs form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputField {
    /// Input name sent back to the backend.
    pub name: String,
    /// Human-readable label, e.g. `Start date` for `start_date`.
    pub label: String,
    pub required: bool,
    pub value: String,
}

/// Form opened by an `input_request`: the tool could not find every input
/// it needs in the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputForm {
    pub tool: String,
    pub heading: String,
    pub description: String,
    /// Required (missing) fields first, then found fields prefilled.
    pub fields: Vec<InputField>,
}

impl InputForm {
    #[must_use]
    pub fn new(
        tool: &str,
        inputs_description: &str,
        missing_inputs: &[String],
        found_inputs: &BTreeMap<String, Value>,
    ) -> Self {
        let mut fields = missing_inputs
            .iter()
            .map(|name| InputField {
                name: name.clone(),
                label: format_label(name),
                required: true,
                value: String::new(),
            })
            .collect::<Vec<_>>();

        fields.extend(
            found_inputs
                .iter()
                .filter(|(name, _)| !missing_inputs.contains(name))
                .map(|(name, value)| InputField {
                    name: name.clone(),
                    label: format_label(name),
                    required: false,
                    value: prefill(value),
                }),
        );

        Self {
            tool: tool.to_owned(),
            heading: format!("Tool is missing inputs: {}", tool.replace('_', " ")),
            description: format!("Inputs description:\n{}", format_label(inputs_description)),
            fields,
        }
    }

    /// Set a field value by name. Returns `false` if no such field exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Build the `inputs` request carrying every field value.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingInput`] naming the first empty required field.
    pub fn to_request(&self) -> Result<ClientMessage, ClientError> {
        if let Some(field) = self.fields.iter().find(|field| field.required && field.value.is_empty()) {
            return Err(ClientError::MissingInput(field.name.clone()));
        }
        let inputs = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect();
        Ok(ClientMessage::Inputs { tool: self.tool.clone(), inputs })
    }
}

fn format_label(raw: &str) -> String {
    let mut chars = raw.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    capitalized.replace('_', " ")
}

fn prefill(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    pending_inputs: Option<InputForm>,
}

impl ChatState {
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn pending_inputs(&self) -> Option<&InputForm> {
        self.pending_inputs.as_ref()
    }

    pub fn pending_inputs_mut(&mut self) -> Option<&mut InputForm> {
        self.pending_inputs.as_mut()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(Author::User, text));
    }

    pub fn loading_response(&mut self) {
        self.messages.push(ChatMessage {
            author: Author::Bot,
            text: PLACEHOLDER_TEXT.to_owned(),
            placeholder: true,
        });
    }

    pub fn ai_response(&mut self, text: impl Into<String>) {
        self.remove_placeholder();
        self.messages.push(ChatMessage::new(Author::Bot, text));
    }

    /// Append the initial history page.
    pub fn chat_history(&mut self, entries: Vec<HistoryEntry>) {
        self.messages.extend(entries.into_iter().map(ChatMessage::from));
    }

    /// Insert an older history page. Each entry goes to the very top in
    /// arrival order, so the last entry of the page ends up first.
    pub fn more_chat_history(&mut self, entries: Vec<HistoryEntry>) {
        for entry in entries {
            self.messages.insert(0, ChatMessage::from(entry));
        }
    }

    /// Open the inputs form, replacing any form still pending.
    pub fn input_request(&mut self, form: InputForm) {
        self.pending_inputs = Some(form);
    }

    /// Remove the inputs form and the loading placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoInputRequest`] if no form is open.
    pub fn close_inputs(&mut self) -> Result<InputForm, ClientError> {
        let form = self.pending_inputs.take().ok_or(ClientError::NoInputRequest)?;
        self.remove_placeholder();
        Ok(form)
    }

    fn remove_placeholder(&mut self) {
        if let Some(index) = self.messages.iter().position(|message| message.placeholder) {
            self.messages.remove(index);
        }
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
