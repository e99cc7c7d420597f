use memdesk_core::{MemoryController, MockMemoryGateway, CONTENT_PREVIEW_CHARS};
use std::sync::Arc;

#[tokio::test]
async fn snapshot_rows_carry_preview_selection_and_armed_state() {
    let long = "x".repeat(CONTENT_PREVIEW_CHARS + 20);
    let gateway = MockMemoryGateway::new()
        .with_entries(&[("short", "tiny", "facts"), ("long", long.as_str(), "prefs")]);
    let mut controller = MemoryController::new(Arc::new(gateway));
    controller.start().await;
    controller.toggle_selection("long");
    controller.request_delete("short");

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0].preview, "tiny");
    assert!(snapshot.rows[0].delete_armed);
    assert!(!snapshot.rows[0].selected);

    let long_row = &snapshot.rows[1];
    assert!(long_row.selected);
    assert_eq!(long_row.content, long);
    assert_eq!(
        long_row.preview,
        format!("{}...", "x".repeat(CONTENT_PREVIEW_CHARS))
    );
    assert_eq!(snapshot.selected_keys, vec!["long"]);
    assert_eq!(snapshot.categories, vec!["facts", "prefs"]);
    assert_eq!(snapshot.armed_delete_key.as_deref(), Some("short"));
}

#[tokio::test]
async fn snapshot_serializes_with_tagged_phase() {
    let gateway = MockMemoryGateway::new().with_entries(&[("k", "v", "core")]);
    let mut controller = MemoryController::new(Arc::new(gateway));
    controller.start().await;

    let value = serde_json::to_value(controller.snapshot()).unwrap();
    assert_eq!(value["phase"]["phase"], "ready");
    assert!(value["phase"]["banner"].is_null());
    assert_eq!(value["rows"][0]["key"], "k");
    assert_eq!(value["draft"]["submitting"], false);
}
