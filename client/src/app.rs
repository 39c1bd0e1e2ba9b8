//! The chat session object.
//!
//! DESIGN
//! ======
//! [`ChatApp`] owns every piece of client state and is mutated only by the
//! front end's task. It never performs I/O itself: outbound frames go
//! through a caller-supplied [`Transport`], and follow-up work the front end
//! must schedule (balance refresh) is returned as [`AppEffect`]s.

use std::time::Instant;

use frames::{ChatSubmission, ClientMessage, ServerMessage};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::net::Transport;
use crate::net::balance::format_balance;
use crate::state::attachments::AttachmentDraft;
use crate::state::chat::{ChatState, InputForm};
use crate::state::compose::ToolFlags;
use crate::state::notifications::{Notifications, Toast};
use crate::state::pager::HistoryPager;
use crate::state::panels::Panels;
use crate::util::preferences::PreferenceStore;
use crate::util::theme::{self, Theme};

/// Subtype marking a `user_journal` event as a load-more page.
pub const LOAD_MORE_JOURNALS: &str = "load_more_journals";

/// Work the front end must schedule after handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEffect {
    /// Fetch the balance after the configured refresh delay.
    RefreshBalance,
}

#[derive(Debug)]
pub struct ChatApp {
    pub flags: ToolFlags,
    pub draft: AttachmentDraft,
    pub chat: ChatState,
    pub panels: Panels,
    pub notifications: Notifications,
    pub theme: Theme,
    chat_pager: HistoryPager,
    journal_pager: HistoryPager,
    balance: Option<f64>,
}

impl ChatApp {
    #[must_use]
    pub fn new(config: &ClientConfig, theme: Theme) -> Self {
        Self {
            flags: ToolFlags::default(),
            draft: AttachmentDraft::default(),
            chat: ChatState::default(),
            panels: Panels::default(),
            notifications: Notifications::default(),
            theme,
            chat_pager: HistoryPager::new(config.history_debounce),
            journal_pager: HistoryPager::new(config.history_debounce),
            balance: None,
        }
    }

    /// Send `message` with the current flags and pending attachments.
    ///
    /// The draft is cleared only after the frame was handed to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] (and queues a sticky toast) if
    /// the transport is closed, or the encode or send error. The draft is
    /// left untouched on every error.
    pub fn submit(&mut self, message: &str, transport: &impl Transport) -> Result<(), ClientError> {
        if !transport.is_open() {
            self.notifications.push(Toast::connection_lost());
            return Err(ClientError::NotConnected);
        }

        let submission = ChatSubmission {
            message: message.to_owned(),
            use_tools: self.flags.use_tools(),
            extract_inputs: self.flags.extract_inputs(),
            audio: self.draft.audio().map(<[u8]>::to_vec),
            image: self.draft.image().cloned(),
        };
        let frame = frames::encode_chat_message(&submission)?;
        debug!(binary = frame.is_binary(), len = frame.len(), "sending chat message");
        transport.send(frame)?;
        self.draft.take();
        Ok(())
    }

    /// Send a typed request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the transport is closed.
    pub fn request(&self, request: &ClientMessage, transport: &impl Transport) -> Result<(), ClientError> {
        transport.send(frames::OutboundFrame::Text(frames::encode_request(request)?))
    }

    pub fn scroll_chat(&mut self, now: Instant, at_top: bool) {
        self.chat_pager.on_scroll(now, at_top);
    }

    pub fn scroll_journals(&mut self, now: Instant, at_start: bool) {
        self.journal_pager.on_scroll(now, at_start);
    }

    /// Page requests whose debounce window has elapsed.
    pub fn poll_pagers(&mut self, now: Instant) -> Vec<ClientMessage> {
        let mut requests = Vec::new();
        if let Some(chat_offset) = self.chat_pager.poll(now) {
            requests.push(ClientMessage::LoadMoreChat { chat_offset });
        }
        if let Some(journals_offset) = self.journal_pager.poll(now) {
            requests.push(ClientMessage::LoadMoreJournals { journals_offset });
        }
        requests
    }

    /// Earliest instant at which [`Self::poll_pagers`] may return something.
    #[must_use]
    pub fn next_pager_deadline(&self) -> Option<Instant> {
        match (self.chat_pager.next_deadline(), self.journal_pager.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub fn chat_pager(&self) -> &HistoryPager {
        &self.chat_pager
    }

    #[must_use]
    pub fn journal_pager(&self) -> &HistoryPager {
        &self.journal_pager
    }

    /// Apply one inbound event.
    pub fn handle(&mut self, message: ServerMessage) -> Vec<AppEffect> {
        match message {
            ServerMessage::ConnectionEstablished { message } => {
                debug!(%message, "connection established");
            }
            ServerMessage::Notification { type_of_notification, header, message } => {
                self.notifications.push(Toast::new(type_of_notification.into(), header, message));
            }
            profile @ ServerMessage::UserProfile { .. } => self.apply_profile(&profile),
            ServerMessage::UserJournal {
                subtype,
                journals,
                messages_for_journal_update,
                messages_till_journal_update,
                gpt_model,
            } => {
                if subtype.as_deref() == Some(LOAD_MORE_JOURNALS) {
                    self.journal_pager.on_page(journals.len());
                    self.panels.journal.prepend(journals);
                } else {
                    self.panels.journal.apply(
                        journals,
                        messages_for_journal_update,
                        messages_till_journal_update,
                        gpt_model,
                    );
                }
            }
            ServerMessage::UserResponder { gpt_model, responder_personality, messages_for_input_extraction } => {
                self.panels.responder.apply(gpt_model, responder_personality, messages_for_input_extraction);
            }
            ServerMessage::UserTransactionsHistory { transactions } => {
                self.panels.transactions.apply(&transactions);
            }
            ServerMessage::LoadingResponse => self.chat.loading_response(),
            ServerMessage::UserMessage { user_message } => self.chat.push_user(user_message),
            ServerMessage::AiResponse { ai_message } => {
                self.chat.ai_response(ai_message);
                return vec![AppEffect::RefreshBalance];
            }
            ServerMessage::InputRequest { tool, inputs_description, missing_inputs, found_inputs } => {
                let form = InputForm::new(&tool, &inputs_description, &missing_inputs, &found_inputs);
                self.chat.input_request(form);
                return vec![AppEffect::RefreshBalance];
            }
            ServerMessage::ChatHistory { chat } => self.chat.chat_history(chat),
            ServerMessage::MoreChatHistory { chat } => {
                self.chat_pager.on_page(chat.len());
                self.chat.more_chat_history(chat);
            }
            ServerMessage::Unknown => warn!("ignoring unknown server message"),
        }
        Vec::new()
    }

    fn apply_profile(&mut self, message: &ServerMessage) {
        let ServerMessage::UserProfile {
            messages_for_profile_update,
            messages_till_profile_update,
            gpt_model,
            ..
        } = message
        else {
            return;
        };
        match message.profile_entries() {
            Some(Ok(entries)) => self.panels.profile.apply(
                entries,
                *messages_for_profile_update,
                *messages_till_profile_update,
                gpt_model.clone(),
            ),
            Some(Err(error)) => warn!(%error, "malformed profile payload"),
            None => {}
        }
    }

    /// Record that the socket closed.
    pub fn on_closed(&mut self) {
        self.notifications.push(Toast::disconnected());
    }

    /// Send the pending inputs form, then close it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoInputRequest`] if no form is open,
    /// [`ClientError::MissingInput`] if a required field is empty, or a
    /// transport error. The form stays open on error.
    pub fn submit_inputs(&mut self, transport: &impl Transport) -> Result<(), ClientError> {
        let request = self.chat.pending_inputs().ok_or(ClientError::NoInputRequest)?.to_request()?;
        self.request(&request, transport)?;
        self.chat.close_inputs()?;
        Ok(())
    }

    /// Discard the pending inputs form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoInputRequest`] if no form is open.
    pub fn cancel_inputs(&mut self) -> Result<(), ClientError> {
        self.chat.close_inputs().map(|_| ())
    }

    /// Flip and persist the theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be saved.
    pub fn toggle_theme(&mut self, store: &mut impl PreferenceStore) -> Result<Theme, ClientError> {
        self.theme = theme::toggle(store, self.theme)?;
        Ok(self.theme)
    }

    /// Record a fetched balance. `None` means the backend reported no
    /// balance for this session.
    pub fn set_balance(&mut self, balance: Option<f64>) {
        self.balance = balance;
    }

    #[must_use]
    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    /// Balance formatted for display, e.g. `4.20$`.
    #[must_use]
    pub fn balance_label(&self) -> Option<String> {
        self.balance.map(format_balance)
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
