use super::*;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use frames::{
    ClientText, HistoryEntry, ImageAttachment, JournalEntry, NotificationKind, OutboundFrame,
    Transaction,
};
use serde_json::json;

use crate::state::notifications::ToastKind;
use crate::util::preferences::MemoryStore;

/// Records every frame instead of sending it.
#[derive(Default)]
struct RecordingTransport {
    closed: Cell<bool>,
    reject_sends: Cell<bool>,
    sent: RefCell<Vec<OutboundFrame>>,
}

impl RecordingTransport {
    fn closed() -> Self {
        Self { closed: Cell::new(true), ..Self::default() }
    }

    fn sent_requests(&self) -> Vec<ClientMessage> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|frame| match frame {
                OutboundFrame::Text(text) => match frames::decode_client_text(text) {
                    Ok(ClientText::Request(request)) => Some(request),
                    _ => None,
                },
                OutboundFrame::Binary(_) => None,
            })
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn is_open(&self) -> bool {
        !self.closed.get()
    }

    fn send(&self, frame: OutboundFrame) -> Result<(), ClientError> {
        if self.closed.get() || self.reject_sends.get() {
            return Err(ClientError::NotConnected);
        }
        self.sent.borrow_mut().push(frame);
        Ok(())
    }
}

fn app() -> ChatApp {
    ChatApp::new(&ClientConfig::new("http://localhost:8000"), Theme::Light)
}

fn history(messages: &[&str]) -> Vec<HistoryEntry> {
    messages.iter().map(|m| HistoryEntry { is_bot: true, message: (*m).to_owned() }).collect()
}

// =============================================================
// Sending
// =============================================================

#[test]
fn plain_submit_sends_text_frame_with_flags() {
    let mut app = app();
    let transport = RecordingTransport::default();
    app.flags.set_use_tools(true);
    app.flags.set_extract_inputs(true);

    app.submit("plan my trip", &transport).unwrap();

    let sent = transport.sent.borrow();
    let OutboundFrame::Text(text) = &sent[0] else {
        panic!("expected text frame");
    };
    let ClientText::Chat(chat) = frames::decode_client_text(text).unwrap() else {
        panic!("expected plain chat");
    };
    assert_eq!(chat.message, "plan my trip");
    assert!(chat.use_tools && chat.extract_inputs);
}

#[test]
fn submit_with_attachments_sends_binary_and_clears_draft() {
    let mut app = app();
    let transport = RecordingTransport::default();
    app.draft.set_audio(vec![1, 2, 3]);
    app.draft.set_image(ImageAttachment { bytes: vec![9], mime_type: "image/png".to_owned() });

    app.submit("look | listen", &transport).unwrap();

    assert!(app.draft.is_empty());
    let sent = transport.sent.borrow();
    let OutboundFrame::Binary(bytes) = &sent[0] else {
        panic!("expected binary frame");
    };
    let frame = frames::decode_media_frame(bytes).unwrap();
    assert_eq!(frame.metadata.message, "look | listen");
    assert_eq!(frame.audio, Some(vec![1, 2, 3]));
    assert_eq!(frame.image, Some(vec![9]));
    assert_eq!(frame.metadata.image_type.as_deref(), Some("image/png"));
}

#[test]
fn submit_while_closed_keeps_draft_and_warns() {
    let mut app = app();
    let transport = RecordingTransport::closed();
    app.draft.set_audio(vec![1]);

    let err = app.submit("hello", &transport).unwrap_err();

    assert!(matches!(err, ClientError::NotConnected));
    assert_eq!(app.draft.audio(), Some(&[1][..]));
    let toast = app.notifications.latest().unwrap();
    assert_eq!(toast.header, "Connection lost");
    assert!(toast.is_sticky());
    assert!(transport.sent.borrow().is_empty());
}

#[test]
fn failed_send_keeps_attachments_for_retry() {
    let mut app = app();
    let transport = RecordingTransport::default();
    transport.reject_sends.set(true);
    app.draft.set_audio(vec![4, 5]);
    app.draft.set_image(ImageAttachment { bytes: vec![6], mime_type: "image/gif".to_owned() });

    assert!(app.submit("retry me", &transport).is_err());
    assert_eq!(app.draft.audio(), Some(&[4, 5][..]));
    assert_eq!(app.draft.image().map(|image| image.mime_type.as_str()), Some("image/gif"));

    transport.reject_sends.set(false);
    app.submit("retry me", &transport).unwrap();
    assert!(app.draft.is_empty());
    assert_eq!(transport.sent.borrow().len(), 1);
}

// =============================================================
// Inbound events
// =============================================================

#[test]
fn ai_response_and_input_request_refresh_balance() {
    let mut app = app();
    assert!(app.handle(ServerMessage::LoadingResponse).is_empty());
    assert_eq!(
        app.handle(ServerMessage::AiResponse { ai_message: "done".to_owned() }),
        vec![AppEffect::RefreshBalance]
    );
    assert_eq!(app.chat.messages().len(), 1);

    let effects = app.handle(ServerMessage::InputRequest {
        tool: "send_email".to_owned(),
        inputs_description: "recipient".to_owned(),
        missing_inputs: vec!["to".to_owned()],
        found_inputs: BTreeMap::new(),
    });
    assert_eq!(effects, vec![AppEffect::RefreshBalance]);
    assert!(app.chat.pending_inputs().is_some());
}

#[test]
fn notifications_become_toasts() {
    let mut app = app();
    app.handle(ServerMessage::Notification {
        type_of_notification: NotificationKind::Success,
        header: "Saved".to_owned(),
        message: "Settings updated".to_owned(),
    });
    let toast = app.notifications.latest().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert!(!toast.is_sticky());
}

#[test]
fn profile_event_fills_panel_and_bad_payload_is_ignored() {
    let mut app = app();
    app.handle(ServerMessage::UserProfile {
        profile: json!(["likes tea"]).to_string(),
        messages_for_profile_update: 5,
        messages_till_profile_update: 2,
        gpt_model: Some("gpt-4o".to_owned()),
    });
    assert_eq!(app.panels.profile.entries, vec!["likes tea".to_owned()]);
    assert_eq!(app.panels.profile.messages_till_update, 2);

    app.handle(ServerMessage::UserProfile {
        profile: "not json".to_owned(),
        messages_for_profile_update: 1,
        messages_till_profile_update: 1,
        gpt_model: None,
    });
    assert_eq!(app.panels.profile.entries, vec!["likes tea".to_owned()]);
}

#[test]
fn connection_established_changes_nothing() {
    let mut app = app();
    let effects =
        app.handle(ServerMessage::ConnectionEstablished { message: "You are connected!".to_owned() });

    assert!(effects.is_empty());
    assert!(app.chat.messages().is_empty());
    assert!(app.notifications.is_empty());
}

#[test]
fn user_message_and_history_fill_the_transcript() {
    use crate::state::chat::Author;

    let mut app = app();
    app.handle(ServerMessage::ChatHistory {
        chat: vec![
            HistoryEntry { is_bot: false, message: "hi".to_owned() },
            HistoryEntry { is_bot: true, message: "hello".to_owned() },
        ],
    });
    app.handle(ServerMessage::UserMessage { user_message: "what's new?".to_owned() });

    let transcript = app
        .chat
        .messages()
        .iter()
        .map(|m| (m.author, m.text.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        transcript,
        vec![(Author::User, "hi"), (Author::Bot, "hello"), (Author::User, "what's new?")]
    );

    app.handle(ServerMessage::ChatHistory { chat: Vec::new() });
    assert!(!app.chat_pager().is_exhausted());

    app.handle(ServerMessage::MoreChatHistory { chat: history(&["older", "oldest"]) });
    let first = app.chat.messages().iter().take(2).map(|m| m.text.as_str()).collect::<Vec<_>>();
    assert_eq!(first, vec!["oldest", "older"]);
    assert_eq!(app.chat.messages().len(), 5);
}

#[test]
fn full_journal_load_replaces_entries_and_settings() {
    let mut app = app();
    let entry = |date: &str| JournalEntry { date: date.to_owned(), updates_count: 2, journal: "{}".to_owned() };
    app.panels.journal.entries = vec![entry("stale")];

    app.handle(ServerMessage::UserJournal {
        subtype: None,
        journals: vec![entry("05"), entry("06")],
        messages_for_journal_update: Some(20),
        messages_till_journal_update: Some(7),
        gpt_model: Some("gpt-4o-mini".to_owned()),
    });

    let dates = app.panels.journal.entries.iter().map(|e| e.date.as_str()).collect::<Vec<_>>();
    assert_eq!(dates, vec!["05", "06"]);
    assert_eq!(app.panels.journal.messages_for_update, 20);
    assert_eq!(app.panels.journal.messages_till_update, 7);
    assert_eq!(app.panels.journal.current_model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(app.journal_pager().offset(), 0);
}

#[test]
fn responder_event_fills_responder_panel() {
    let mut app = app();
    let effects = app.handle(ServerMessage::UserResponder {
        gpt_model: Some("gpt-4o".to_owned()),
        responder_personality: "calm and brief".to_owned(),
        messages_for_input_extraction: 6,
    });

    assert!(effects.is_empty());
    let panel = &app.panels.responder;
    assert_eq!(panel.current_model.as_deref(), Some("gpt-4o"));
    assert_eq!(panel.personality, "calm and brief");
    assert_eq!(panel.messages_for_input_extraction, 6);
}

#[test]
fn transactions_event_replaces_usage_rows() {
    let mut app = app();
    let transaction = |kind: &str, amount: f64| Transaction {
        kind: kind.to_owned(),
        datetime: "2024-05-01T10:00:00".to_owned(),
        amount,
    };
    app.handle(ServerMessage::UserTransactionsHistory {
        transactions: vec![transaction("chat", 0.5), transaction("audio", 1.0)],
    });
    app.handle(ServerMessage::UserTransactionsHistory {
        transactions: vec![transaction("top-up", 2.5)],
    });

    let rows = &app.panels.transactions.rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "top-up");
    assert_eq!(rows[0].datetime, "2024-05-01 10:00:00 UTC");
    assert_eq!(rows[0].amount, "2.5$");
}

#[test]
fn closing_the_socket_queues_sticky_toast() {
    let mut app = app();
    app.on_closed();
    let toast = app.notifications.latest().unwrap();
    assert_eq!(toast.header, "Lost connection");
    assert_eq!(toast.kind, ToastKind::Error);
    assert!(toast.is_sticky());
}

// =============================================================
// Paging
// =============================================================

#[test]
fn chat_pager_requests_until_empty_page() {
    let mut app = app();
    let start = Instant::now();
    let later = |ms| start + Duration::from_millis(ms);

    app.scroll_chat(start, true);
    assert_eq!(app.next_pager_deadline(), Some(later(500)));
    assert_eq!(app.poll_pagers(later(500)), vec![ClientMessage::LoadMoreChat { chat_offset: 1 }]);

    app.handle(ServerMessage::MoreChatHistory { chat: history(&["a", "b"]) });
    assert_eq!(app.chat.messages().len(), 2);

    app.scroll_chat(later(600), true);
    assert_eq!(app.poll_pagers(later(1100)), vec![ClientMessage::LoadMoreChat { chat_offset: 2 }]);
    app.handle(ServerMessage::MoreChatHistory { chat: Vec::new() });
    assert!(app.chat_pager().is_exhausted());

    app.scroll_chat(later(1200), true);
    assert!(app.poll_pagers(later(5000)).is_empty());
}

#[test]
fn journal_pages_are_prepended_and_tracked() {
    let mut app = app();
    let start = Instant::now();
    let entry = |date: &str| JournalEntry { date: date.to_owned(), updates_count: 1, journal: "{}".to_owned() };

    app.handle(ServerMessage::UserJournal {
        subtype: None,
        journals: vec![entry("03")],
        messages_for_journal_update: Some(4),
        messages_till_journal_update: Some(2),
        gpt_model: None,
    });
    app.scroll_journals(start, true);
    assert_eq!(
        app.poll_pagers(start + Duration::from_millis(500)),
        vec![ClientMessage::LoadMoreJournals { journals_offset: 1 }]
    );
    app.handle(ServerMessage::UserJournal {
        subtype: Some(LOAD_MORE_JOURNALS.to_owned()),
        journals: vec![entry("01"), entry("02")],
        messages_for_journal_update: None,
        messages_till_journal_update: None,
        gpt_model: None,
    });

    let dates = app.panels.journal.entries.iter().map(|e| e.date.as_str()).collect::<Vec<_>>();
    assert_eq!(dates, vec!["01", "02", "03"]);
    assert_eq!(app.panels.journal.messages_for_update, 4);
    assert!(!app.journal_pager().is_loading());
}

// =============================================================
// Inputs, theme, balance
// =============================================================

#[test]
fn submit_inputs_sends_request_and_closes_form() {
    let mut app = app();
    let transport = RecordingTransport::default();
    app.handle(ServerMessage::LoadingResponse);
    app.handle(ServerMessage::InputRequest {
        tool: "send_email".to_owned(),
        inputs_description: String::new(),
        missing_inputs: vec!["to".to_owned()],
        found_inputs: BTreeMap::from([("subject".to_owned(), json!("Hi"))]),
    });

    assert!(matches!(app.submit_inputs(&transport), Err(ClientError::MissingInput(_))));
    assert!(app.chat.pending_inputs().is_some());

    app.chat.pending_inputs_mut().unwrap().set("to", "a@b.c");
    app.submit_inputs(&transport).unwrap();

    assert!(app.chat.pending_inputs().is_none());
    assert!(app.chat.messages().is_empty());
    let requests = transport.sent_requests();
    let ClientMessage::Inputs { tool, inputs } = &requests[0] else {
        panic!("expected inputs request");
    };
    assert_eq!(tool, "send_email");
    assert_eq!(inputs["to"], "a@b.c");
    assert_eq!(inputs["subject"], "Hi");
}

#[test]
fn inputs_without_form_is_an_error() {
    let mut app = app();
    let transport = RecordingTransport::default();
    assert!(matches!(app.submit_inputs(&transport), Err(ClientError::NoInputRequest)));
    assert!(matches!(app.cancel_inputs(), Err(ClientError::NoInputRequest)));
}

#[test]
fn toggle_theme_persists() {
    let mut app = app();
    let mut store = MemoryStore::default();
    assert_eq!(app.toggle_theme(&mut store).unwrap(), Theme::Dark);
    assert_eq!(store.get(theme::THEME_KEY).as_deref(), Some("dark"));
    assert_eq!(app.theme, Theme::Dark);
}

#[test]
fn balance_label_formats_two_decimals() {
    let mut app = app();
    assert_eq!(app.balance_label(), None);
    app.set_balance(Some(4.2));
    assert_eq!(app.balance_label().as_deref(), Some("4.20$"));
    assert_eq!(app.balance(), Some(4.2));
}
