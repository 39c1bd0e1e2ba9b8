use super::*;
use serde_json::json;

fn to_value(request: &ClientMessage) -> Value {
    serde_json::from_str(&encode_request(request).expect("encode")).expect("json")
}

// =============================================================
// Outbound requests
// =============================================================

#[test]
fn unit_requests_serialize_to_bare_type_tag() {
    assert_eq!(to_value(&ClientMessage::UserProfile), json!({"type": "user_profile"}));
    assert_eq!(to_value(&ClientMessage::UserJournal), json!({"type": "user_journal"}));
    assert_eq!(to_value(&ClientMessage::UserResponder), json!({"type": "user_responder"}));
    assert_eq!(to_value(&ClientMessage::UserTransactions), json!({"type": "user_transactions"}));
}

#[test]
fn paging_requests_carry_offsets() {
    assert_eq!(
        to_value(&ClientMessage::LoadMoreChat { chat_offset: 3 }),
        json!({"type": "load_more_chat", "chat_offset": 3})
    );
    assert_eq!(
        to_value(&ClientMessage::LoadMoreJournals { journals_offset: 1 }),
        json!({"type": "load_more_journals", "journals_offset": 1})
    );
}

#[test]
fn settings_requests_use_model_wire_names_and_null_for_keep() {
    let value = to_value(&ClientMessage::UserProfileSettings {
        messages_for_profile_update: 10,
        messages_till_profile_update: 5,
        profiler_gpt_model: Some(GptModel::Gpt4oMini),
    });
    assert_eq!(value["profiler_gpt_model"], "gpt-4o-mini");

    let value = to_value(&ClientMessage::UserResponderSettings {
        responder_gpt_model: None,
        responder_personality: "calm".to_owned(),
        messages_for_input_extraction: 4,
    });
    assert!(value["responder_gpt_model"].is_null());
    assert_eq!(value["type"], "user_responder_settings");
}

#[test]
fn inputs_request_serializes_tool_and_map() {
    let mut inputs = BTreeMap::new();
    inputs.insert("city".to_owned(), "Kyiv".to_owned());
    let value = to_value(&ClientMessage::Inputs { tool: "get_weather".to_owned(), inputs });
    assert_eq!(value, json!({"type": "inputs", "tool": "get_weather", "inputs": {"city": "Kyiv"}}));
}

#[test]
fn gpt_model_selector_mapping() {
    assert_eq!(GptModel::from_selector(0), None);
    assert_eq!(GptModel::from_selector(1), Some(GptModel::Gpt4o));
    assert_eq!(GptModel::from_selector(2), Some(GptModel::Gpt4oMini));
    assert_eq!(GptModel::from_selector(7), None);
    assert_eq!(GptModel::display_raw("gpt-4o"), "GPT-4o");
    assert_eq!(GptModel::display_raw("o1"), "o1");
}

#[test]
fn display_raw_borrows_from_owned_model_names() {
    let known = String::from("gpt-4o-mini");
    let unknown = String::from("custom-model");
    assert_eq!(GptModel::display_raw(&known), "GPT-4o-mini (Smaller and cheaper version)");
    assert_eq!(GptModel::display_raw(&unknown), "custom-model");
}

// =============================================================
// Client text decoding (backend side)
// =============================================================

#[test]
fn decode_client_text_distinguishes_plain_chat_from_requests() {
    let chat = decode_client_text(r#"{"message":"hi","use_tools":true,"extract_inputs":false}"#)
        .expect("chat");
    assert_eq!(
        chat,
        ClientText::Chat(PlainChat { message: "hi".to_owned(), use_tools: true, extract_inputs: false })
    );

    let request = decode_client_text(r#"{"type":"load_more_chat","chat_offset":"2"}"#).expect("request");
    assert_eq!(request, ClientText::Request(ClientMessage::LoadMoreChat { chat_offset: 2 }));
}

#[test]
fn decode_client_text_accepts_string_slider_values() {
    let text = r#"{"type":"user_journal_settings","messages_for_journal_update":"20","messages_till_journal_update":"3","journal_gpt_model":"gpt-4o"}"#;
    let decoded = decode_client_text(text).expect("decode");
    assert_eq!(
        decoded,
        ClientText::Request(ClientMessage::UserJournalSettings {
            messages_for_journal_update: 20,
            messages_till_journal_update: 3,
            journal_gpt_model: Some(GptModel::Gpt4o),
        })
    );
}

// =============================================================
// Inbound events
// =============================================================

#[test]
fn decodes_notification_with_unknown_kind_as_info() {
    let msg = decode_server_message(
        r#"{"type":"notification","type_of_notification":"warning","header":"H","message":"M"}"#,
    )
    .expect("decode");
    assert_eq!(
        msg,
        ServerMessage::Notification {
            type_of_notification: NotificationKind::Info,
            header: "H".to_owned(),
            message: "M".to_owned(),
        }
    );
}

#[test]
fn decodes_chat_events() {
    assert_eq!(
        decode_server_message(r#"{"type":"loading_response"}"#).expect("decode"),
        ServerMessage::LoadingResponse
    );
    assert_eq!(
        decode_server_message(r#"{"type":"ai_response","ai_message":"**hi**"}"#).expect("decode"),
        ServerMessage::AiResponse { ai_message: "**hi**".to_owned() }
    );
    let history = decode_server_message(
        r#"{"type":"more_chat_history","chat":[{"is_bot":true,"message":"a"},{"is_bot":false,"message":"b"}]}"#,
    )
    .expect("decode");
    let ServerMessage::MoreChatHistory { chat } = history else {
        panic!("expected more_chat_history");
    };
    assert_eq!(chat.len(), 2);
    assert!(chat[0].is_bot);
}

#[test]
fn decodes_user_profile_and_parses_entries() {
    let msg = decode_server_message(
        r#"{"type":"user_profile","profile":"[\"likes tea\",\"lives in Lviv\"]","messages_for_profile_update":10,"messages_till_profile_update":"4","gpt_model":"gpt-4o"}"#,
    )
    .expect("decode");
    let entries = msg.profile_entries().expect("profile variant").expect("entries");
    assert_eq!(entries, vec!["likes tea".to_owned(), "lives in Lviv".to_owned()]);
    assert!(ServerMessage::LoadingResponse.profile_entries().is_none());
}

#[test]
fn decodes_load_more_journals_without_settings() {
    let msg = decode_server_message(
        r#"{"type":"user_journal","subtype":"load_more_journals","journals":[]}"#,
    )
    .expect("decode");
    assert_eq!(
        msg,
        ServerMessage::UserJournal {
            subtype: Some("load_more_journals".to_owned()),
            journals: Vec::new(),
            messages_for_journal_update: None,
            messages_till_journal_update: None,
            gpt_model: None,
        }
    );
}

#[test]
fn journal_emotions_sort_descending_by_score() {
    let entry = JournalEntry {
        date: "2024-05-01".to_owned(),
        updates_count: 2,
        journal: r#"{"joy": 3, "anger": 7, "calm": 3.5}"#.to_owned(),
    };
    let emotions = entry.emotions().expect("emotions");
    let names = emotions.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["anger", "calm", "joy"]);
}

#[test]
fn decodes_transactions_with_string_amounts() {
    let msg = decode_server_message(
        r#"{"type":"user_transactions_history","transactions":[{"type":"top-up","datetime":"2024-05-01T10:00:00","amount":"5.5000"}]}"#,
    )
    .expect("decode");
    let ServerMessage::UserTransactionsHistory { transactions } = msg else {
        panic!("expected transactions");
    };
    assert_eq!(transactions[0].kind, "top-up");
    assert!((transactions[0].amount - 5.5).abs() < f64::EPSILON);
}

#[test]
fn decodes_input_request_with_mixed_found_values() {
    let msg = decode_server_message(
        r#"{"type":"input_request","tool":"send_email","inputs_description":"who and what","missing_inputs":["to"],"found_inputs":{"to":null,"subject":"Hi","count":2}}"#,
    )
    .expect("decode");
    let ServerMessage::InputRequest { tool, missing_inputs, found_inputs, .. } = msg else {
        panic!("expected input_request");
    };
    assert_eq!(tool, "send_email");
    assert_eq!(missing_inputs, vec!["to".to_owned()]);
    assert_eq!(found_inputs.len(), 3);
}

#[test]
fn unknown_type_decodes_to_unknown() {
    let msg = decode_server_message(r#"{"type":"server_side_only","x":1}"#).expect("decode");
    assert_eq!(msg, ServerMessage::Unknown);
}

#[test]
fn connection_established_is_recognized() {
    let msg = decode_server_message(
        r#"{"type":"connection_established","message":"You are connected!"}"#,
    )
    .expect("decode");
    assert_eq!(msg, ServerMessage::ConnectionEstablished { message: "You are connected!".to_owned() });
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(decode_server_message("{not json"), Err(CodecError::Json(_))));
    assert!(matches!(decode_server_message(r#"{"no_type":true}"#), Err(CodecError::Json(_))));
}
