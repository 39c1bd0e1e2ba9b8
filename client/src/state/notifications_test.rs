use super::*;

#[test]
fn backend_kinds_map_to_toast_kinds() {
    assert_eq!(ToastKind::from(NotificationKind::Error), ToastKind::Error);
    assert_eq!(ToastKind::from(NotificationKind::Success), ToastKind::Success);
    assert_eq!(ToastKind::from(NotificationKind::Info), ToastKind::Info);
}

#[test]
fn connection_toasts_are_sticky_errors() {
    let lost = Toast::connection_lost();
    assert_eq!(lost.kind, ToastKind::Error);
    assert_eq!(lost.header, "Connection lost");
    assert_eq!(lost.delay, Some(CONNECTION_LOST_DELAY));
    assert!(lost.is_sticky());

    let closed = Toast::disconnected();
    assert_eq!(closed.header, "Lost connection");
    assert!(closed.message.starts_with("Disconnected from the server."));
    assert_eq!(closed.delay, Some(DISCONNECTED_DELAY));
}

#[test]
fn queue_drains_oldest_first() {
    let mut queue = Notifications::default();
    queue.push(Toast::new(ToastKind::Success, "Saved", "Profile updated"));
    queue.push(Toast::connection_lost());

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.latest().map(|t| t.header.as_str()), Some("Connection lost"));

    let drained = queue.drain();
    assert_eq!(drained[0].header, "Saved");
    assert!(!drained[0].is_sticky());
    assert!(queue.is_empty());
}
