use hostsync_core::db::open_db_in_memory;
use hostsync_core::{
    ActionSlot, ConfigRecord, ConfigStore, JumpPoints, KeyList, Keybindings, RepoError,
    SettingValue, Settings, SqliteConfigStore,
};
use rusqlite::Connection;

fn setting(host: &str, key: &str, value: impl Into<SettingValue>) -> ConfigRecord<Settings> {
    ConfigRecord::new(host, key.to_string(), value.into(), ())
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteConfigStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("schema version")));
}

#[test]
fn distinct_queries_return_ascending_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    store.upsert_record(&setting("ned", "theme", "dark")).unwrap();
    store.upsert_record(&setting("moe", "editor", "vim")).unwrap();
    store.upsert_record(&setting("barney", "theme", "light")).unwrap();
    store.upsert_record(&setting("ned", "editor", "emacs")).unwrap();

    assert_eq!(
        ConfigStore::<Settings>::distinct_hosts(&store).unwrap(),
        ["barney", "moe", "ned"]
    );
    assert_eq!(
        ConfigStore::<Settings>::distinct_slots(&store).unwrap(),
        ["editor", "theme"]
    );
}

#[test]
fn distinct_keybinding_slots_order_by_context_then_action() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    for (context, action) in [("editor", "save"), ("browser", "reload"), ("editor", "quit")] {
        store
            .upsert_record(&ConfigRecord::<Keybindings>::new(
                "ned",
                ActionSlot::new(context, action),
                KeyList::from_keys(["ctrl", "s"]),
                None,
            ))
            .unwrap();
    }

    let slots = ConfigStore::<Keybindings>::distinct_slots(&store).unwrap();
    assert_eq!(
        slots,
        vec![
            ActionSlot::new("browser", "reload"),
            ActionSlot::new("editor", "quit"),
            ActionSlot::new("editor", "save"),
        ]
    );
}

#[test]
fn upsert_updates_existing_row_in_place() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    store.upsert_record(&setting("ned", "font_size", 12_i64)).unwrap();
    store.upsert_record(&setting("ned", "font_size", 14_i64)).unwrap();

    let records = ConfigStore::<Settings>::list_records(&store).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, SettingValue::Integer(14));
}

#[test]
fn setting_values_keep_native_sqlite_types() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    store.upsert_record(&setting("ned", "font_size", 12_i64)).unwrap();
    store.upsert_record(&setting("ned", "opacity", 0.85_f64)).unwrap();
    store.upsert_record(&setting("ned", "theme", "dark")).unwrap();

    let mut stmt = conn
        .prepare("SELECT typeof(data) FROM settings ORDER BY id;")
        .unwrap();
    let kinds: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(kinds, ["integer", "real", "text"]);

    let found = ConfigStore::<Settings>::find_record(&store, "ned", &"opacity".to_string())
        .unwrap()
        .unwrap();
    assert_eq!(found.value, SettingValue::Real(0.85));
}

#[test]
fn find_record_matches_every_slot_column() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    store
        .upsert_record(&ConfigRecord::<Keybindings>::new(
            "ned",
            ActionSlot::new("editor", "save"),
            KeyList::from_keys(["ctrl", "s"]),
            Some("save buffer".to_string()),
        ))
        .unwrap();

    let found =
        ConfigStore::<Keybindings>::find_record(&store, "ned", &ActionSlot::new("editor", "save"))
            .unwrap()
            .unwrap();
    assert_eq!(found.value, KeyList::from_keys(["ctrl", "s"]));
    assert_eq!(found.extra.as_deref(), Some("save buffer"));

    let missing_context =
        ConfigStore::<Keybindings>::find_record(&store, "ned", &ActionSlot::new("browser", "save"));
    assert!(missing_context.unwrap().is_none());
    let missing_host =
        ConfigStore::<Keybindings>::find_record(&store, "moe", &ActionSlot::new("editor", "save"));
    assert!(missing_host.unwrap().is_none());
}

#[test]
fn keylist_is_stored_as_json_array() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    store
        .upsert_record(&ConfigRecord::<JumpPoints>::new(
            "ned",
            "home".to_string(),
            KeyList::from_keys(["ctrl", "h"]),
            None,
        ))
        .unwrap();

    let raw: String = conn
        .query_row(
            "SELECT keylist FROM jumppoints WHERE hostname = 'ned';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(raw, r#"["ctrl","h"]"#);
}

#[test]
fn malformed_keylist_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO jumppoints (hostname, destination, keylist) VALUES ('ned', 'home', 'ctrl+h');",
        [],
    )
    .unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();

    let err = ConfigStore::<JumpPoints>::list_records(&store).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("jumppoints.keylist")));
}
