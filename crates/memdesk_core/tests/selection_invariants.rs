use memdesk_core::{MemoryController, MockMemoryGateway};
use std::collections::BTreeSet;
use std::sync::Arc;

fn assert_selection_subset(controller: &MemoryController<MockMemoryGateway>) {
    let displayed: BTreeSet<String> = controller
        .entries()
        .entries()
        .iter()
        .map(|entry| entry.key.clone())
        .collect();
    for key in controller.selection().keys() {
        assert!(displayed.contains(&key), "selected key `{key}` not displayed");
    }
}

async fn loaded_controller() -> MemoryController<MockMemoryGateway> {
    let gateway = MockMemoryGateway::new().with_entries(&[
        ("a", "alpha", "facts"),
        ("b", "beta", "facts"),
        ("c", "gamma", "prefs"),
    ]);
    let mut controller = MemoryController::new(Arc::new(gateway));
    controller.start().await;
    controller
}

#[tokio::test]
async fn toggle_all_round_trips_between_empty_and_full() {
    let mut controller = loaded_controller().await;

    controller.toggle_select_all();
    assert_eq!(controller.selection().keys(), vec!["a", "b", "c"]);
    controller.toggle_select_all();
    assert!(controller.selection().is_empty());

    controller.toggle_select_all();
    let full = controller.selection().clone();
    controller.toggle_select_all();
    controller.toggle_select_all();
    assert_eq!(controller.selection(), &full);
    assert_selection_subset(&controller);
}

#[tokio::test]
async fn toggle_all_from_partial_selects_everything() {
    let mut controller = loaded_controller().await;
    assert!(controller.toggle_selection("b"));

    controller.toggle_select_all();
    assert_eq!(controller.selection().len(), 3);
    assert!(controller.snapshot().all_selected);
}

#[tokio::test]
async fn toggling_unknown_key_keeps_invariant() {
    let mut controller = loaded_controller().await;
    assert!(!controller.toggle_selection("missing"));
    assert!(controller.selection().is_empty());
    assert_selection_subset(&controller);
}

#[tokio::test]
async fn invariant_holds_across_mixed_operations() {
    let mut controller = loaded_controller().await;
    controller.toggle_selection("a");
    controller.toggle_selection("c");
    assert_selection_subset(&controller);

    assert!(controller.request_delete("a"));
    controller.confirm_delete("a").await.unwrap();
    assert_selection_subset(&controller);
    assert_eq!(controller.selection().keys(), vec!["c"]);

    controller.set_search_text("beta");
    controller.commit_filters().await;
    assert_selection_subset(&controller);
    assert!(controller.selection().is_empty());
}

#[tokio::test]
async fn toggle_all_round_trips_with_duplicate_rows() {
    let gateway = MockMemoryGateway::new().with_entries(&[("a", "x", "core"), ("a", "y", "core")]);
    let mut controller = MemoryController::new(Arc::new(gateway));
    controller.start().await;

    controller.toggle_select_all();
    assert_eq!(controller.selection().len(), 1);
    assert!(controller.snapshot().all_selected);

    controller.toggle_select_all();
    assert!(controller.selection().is_empty());
}
