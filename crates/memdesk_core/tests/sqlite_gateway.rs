use memdesk_core::db::migrations::latest_version;
use memdesk_core::db::{open_db, open_db_in_memory, DbError};
use memdesk_core::{
    EntryQuery, GatewayError, MemoryController, MemoryGateway, MockMemoryGateway, NewEntry,
    SqliteMemoryGateway,
};
use std::sync::Arc;

fn new_entry(key: &str, content: &str, category: Option<&str>) -> NewEntry {
    NewEntry {
        key: key.to_string(),
        content: content.to_string(),
        category: category.map(str::to_string),
    }
}

#[tokio::test]
async fn create_assigns_id_timestamp_and_default_category() {
    let gateway = SqliteMemoryGateway::open_in_memory().unwrap();
    let entry = gateway
        .create(&new_entry("user_pref", "dark mode", None))
        .await
        .unwrap();

    assert_eq!(entry.key, "user_pref");
    assert_eq!(entry.category, "core");
    assert!(!entry.id.is_empty());
    assert!(entry.timestamp.ends_with('Z'));

    let listed = gateway.query(&EntryQuery::unfiltered()).await.unwrap();
    assert_eq!(listed, vec![entry]);
}

#[tokio::test]
async fn ids_stay_stable_across_refetches() {
    let gateway = SqliteMemoryGateway::open_in_memory().unwrap();
    let created = gateway.create(&new_entry("k", "v", None)).await.unwrap();

    let first = gateway.query(&EntryQuery::unfiltered()).await.unwrap();
    let second = gateway
        .query(&EntryQuery::from_filters("v", ""))
        .await
        .unwrap();
    assert_eq!(first[0].id, created.id);
    assert_eq!(second[0].id, created.id);
}

#[tokio::test]
async fn duplicate_key_is_rejected() {
    let gateway = SqliteMemoryGateway::open_in_memory().unwrap();
    gateway.create(&new_entry("k", "one", None)).await.unwrap();

    let err = gateway
        .create(&new_entry("k", "two", None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Rejected("memory key already exists: `k`".to_string())
    );
}

#[tokio::test]
async fn query_filters_by_text_and_category_newest_first() {
    let gateway = SqliteMemoryGateway::open_in_memory().unwrap();
    gateway
        .create(&new_entry("theme", "Dark mode everywhere", Some("prefs")))
        .await
        .unwrap();
    gateway
        .create(&new_entry("dark_fact", "night is dark", Some("facts")))
        .await
        .unwrap();
    gateway
        .create(&new_entry("editor", "uses vim", Some("prefs")))
        .await
        .unwrap();

    let all = gateway.query(&EntryQuery::unfiltered()).await.unwrap();
    let keys: Vec<_> = all.iter().map(|entry| entry.key.as_str()).collect();
    assert_eq!(keys, vec!["editor", "dark_fact", "theme"]);

    let dark = gateway
        .query(&EntryQuery::from_filters("DARK", ""))
        .await
        .unwrap();
    let keys: Vec<_> = dark.iter().map(|entry| entry.key.as_str()).collect();
    assert_eq!(keys, vec!["dark_fact", "theme"]);

    let dark_prefs = gateway
        .query(&EntryQuery::from_filters("dark", "prefs"))
        .await
        .unwrap();
    assert_eq!(dark_prefs.len(), 1);
    assert_eq!(dark_prefs[0].key, "theme");
}

#[tokio::test]
async fn search_text_wildcards_match_literally() {
    let gateway = SqliteMemoryGateway::open_in_memory().unwrap();
    gateway
        .create(&new_entry("progress", "100% done", None))
        .await
        .unwrap();
    gateway
        .create(&new_entry("other", "1000 done", None))
        .await
        .unwrap();

    let hits = gateway
        .query(&EntryQuery::from_filters("0%", ""))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].key, "progress");

    let underscore = gateway
        .query(&EntryQuery::from_filters("_", ""))
        .await
        .unwrap();
    assert!(underscore.is_empty());
}

#[tokio::test]
async fn search_folds_non_ascii_case_like_the_mock() {
    let sqlite = SqliteMemoryGateway::open_in_memory().unwrap();
    sqlite
        .create(&new_entry("motto", "Élan vital", None))
        .await
        .unwrap();
    sqlite
        .create(&new_entry("ÜBER_KEY", "plain", None))
        .await
        .unwrap();
    let mock = MockMemoryGateway::new()
        .with_entries(&[("motto", "Élan vital", "core"), ("ÜBER_KEY", "plain", "core")]);

    for (text, expected) in [("élan", "motto"), ("ÉLAN VITAL", "motto"), ("über", "ÜBER_KEY")] {
        let query = EntryQuery::from_filters(text, "");
        let sqlite_keys: Vec<_> = sqlite
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        let mock_keys: Vec<_> = mock
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(sqlite_keys, vec![expected.to_string()], "search `{text}`");
        assert_eq!(sqlite_keys, mock_keys, "search `{text}`");
    }
}

#[tokio::test]
async fn remove_reports_whether_anything_was_deleted() {
    let gateway = SqliteMemoryGateway::open_in_memory().unwrap();
    gateway.create(&new_entry("k", "v", None)).await.unwrap();

    assert!(gateway.remove("k").await.unwrap().deleted);
    assert!(!gateway.remove("k").await.unwrap().deleted);
    assert!(!gateway.remove("never").await.unwrap().deleted);
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memdesk.sqlite3");
    {
        let gateway = SqliteMemoryGateway::open(&path).unwrap();
        gateway
            .create(&new_entry("persisted", "still here", Some("facts")))
            .await
            .unwrap();
    }

    let gateway = Arc::new(SqliteMemoryGateway::open(&path).unwrap());
    let mut controller = MemoryController::new(gateway);
    controller.start().await;
    assert!(controller.entries().contains_key("persisted"));
    assert_eq!(controller.categories(), vec!["facts"]);
}

#[test]
fn migrations_set_user_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::SchemaTooNew { found: 2, supported: 1 }));

    let gateway_err = SqliteMemoryGateway::open(&path).err().unwrap();
    assert!(matches!(gateway_err, GatewayError::Unavailable(_)));
}
