use super::*;

fn journal(date: &str) -> JournalEntry {
    JournalEntry { date: date.to_owned(), updates_count: 1, journal: r#"{"joy": 0.5}"#.to_owned() }
}

fn dates(panel: &JournalPanel) -> Vec<&str> {
    panel.entries.iter().map(|entry| entry.date.as_str()).collect()
}

// =============================================================
// Profile
// =============================================================

#[test]
fn profile_change_skips_empty_entries() {
    let mut panel = ProfilePanel::default();
    panel.apply(vec!["likes tea".to_owned()], 5, 10, Some("gpt-4o".to_owned()));
    panel.add_entry();
    panel.add_entry();
    panel.entries[2] = "lives in Oslo".to_owned();

    assert_eq!(
        panel.change_request(),
        ClientMessage::UserProfileChange {
            profile: vec!["likes tea".to_owned(), "lives in Oslo".to_owned()]
        }
    );
}

#[test]
fn profile_settings_use_slider_values() {
    let mut panel = ProfilePanel::default();
    panel.apply(Vec::new(), 5, 10, None);
    panel.messages_till_update = 12;

    assert_eq!(
        panel.settings_request(Some(GptModel::Gpt4oMini)),
        ClientMessage::UserProfileSettings {
            messages_for_profile_update: 5,
            messages_till_profile_update: 12,
            profiler_gpt_model: Some(GptModel::Gpt4oMini),
        }
    );
}

#[test]
fn selected_label_uses_display_names() {
    assert_eq!(selected_model_label(Some("gpt-4o")), "Selected: GPT-4o");
    assert_eq!(
        selected_model_label(Some("gpt-4o-mini")),
        "Selected: GPT-4o-mini (Smaller and cheaper version)"
    );
    assert_eq!(selected_model_label(Some("o1")), "Selected: o1");
    assert_eq!(selected_model_label(None), "Selected: default");
}

// =============================================================
// Journal
// =============================================================

#[test]
fn journal_load_replaces_entries_and_keeps_missing_settings() {
    let mut panel = JournalPanel::default();
    panel.apply(vec![journal("old")], Some(3), Some(7), Some("gpt-4o".to_owned()));
    panel.apply(vec![journal("a"), journal("b")], None, Some(9), None);

    assert_eq!(dates(&panel), vec!["a", "b"]);
    assert_eq!(panel.messages_for_update, 3);
    assert_eq!(panel.messages_till_update, 9);
    assert_eq!(panel.current_model, None);
}

#[test]
fn journal_pages_are_prepended_in_order() {
    let mut panel = JournalPanel::default();
    panel.apply(vec![journal("2024-05-03")], None, None, None);
    panel.prepend(vec![journal("2024-05-01"), journal("2024-05-02")]);

    assert_eq!(dates(&panel), vec!["2024-05-01", "2024-05-02", "2024-05-03"]);
}

// =============================================================
// Responder and usage
// =============================================================

#[test]
fn responder_settings_carry_personality() {
    let mut panel = ResponderPanel::default();
    panel.apply(Some("gpt-4o".to_owned()), "Be brief".to_owned(), 4);

    assert_eq!(
        panel.settings_request(None),
        ClientMessage::UserResponderSettings {
            responder_gpt_model: None,
            responder_personality: "Be brief".to_owned(),
            messages_for_input_extraction: 4,
        }
    );
}

#[test]
fn transaction_rows_are_formatted() {
    let mut panel = TransactionsPanel::default();
    panel.apply(&[
        Transaction { kind: "chat".to_owned(), datetime: "2024-05-01T12:30:00.123456".to_owned(), amount: 0.0 },
        Transaction { kind: "top-up".to_owned(), datetime: "2024-05-02T08:00:05".to_owned(), amount: 2.5 },
    ]);

    assert_eq!(
        panel.rows,
        vec![
            TransactionRow {
                kind: "chat".to_owned(),
                datetime: "2024-05-01 12:30:00 UTC".to_owned(),
                amount: "< 0.0001$".to_owned(),
            },
            TransactionRow {
                kind: "top-up".to_owned(),
                datetime: "2024-05-02 08:00:05 UTC".to_owned(),
                amount: "2.5$".to_owned(),
            },
        ]
    );
}

#[test]
fn unrecognized_datetime_is_passed_through() {
    assert_eq!(format_utc_datetime("yesterday"), "yesterday");
    assert_eq!(format_utc_datetime("2024-05-01T12:30"), "2024-05-01 12:30 UTC");
}
