use hostsync_core::db::open_db_in_memory;
use hostsync_core::{
    ConfigRecord, ConfigStore, JumpPoints, JumpPointsService, KeyList, ReconcileError, SlotValue,
    SqliteConfigStore,
};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteConfigStore::try_new(&conn).unwrap();
    for (host, destination, keys, description) in [
        ("ned", "home", ["ctrl", "h"], "jump to home dir"),
        ("ned", "mail", ["ctrl", "m"], "open mail"),
        ("moe", "mail", ["alt", "m"], "moe mail"),
        ("moe", "work", ["ctrl", "w"], "open work"),
    ] {
        store
            .upsert_record(&ConfigRecord::<JumpPoints>::new(
                host,
                destination.to_string(),
                KeyList::from_keys(keys),
                Some(description.to_string()),
            ))
            .unwrap();
    }
    conn
}

fn stored_row(conn: &Connection, host: &str, destination: &str) -> (String, Option<String>) {
    conn.query_row(
        "SELECT keylist, description FROM jumppoints WHERE hostname = ?1 AND destination = ?2;",
        [host, destination],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap()
}

#[test]
fn hosts_and_slots_are_discovered_in_ascending_order() {
    let conn = setup();
    let service = JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();

    assert_eq!(service.hosts(), ["moe", "ned"]);
    assert_eq!(service.slots(), ["home", "mail", "work"]);
}

#[test]
fn compare_reports_home_as_only_on_ned() {
    let conn = setup();
    let service = JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();

    let result = service.compare("ned", "moe").unwrap();

    assert_eq!(
        result.only_host1,
        vec![SlotValue {
            slot: "home".to_string(),
            value: KeyList::from_keys(["ctrl", "h"]),
        }]
    );
    assert_eq!(result.only_host2.len(), 1);
    assert_eq!(result.only_host2[0].slot, "work");
    assert!(result.matching.is_empty());
    assert_eq!(result.different_slots(), vec!["mail".to_string()]);
    assert_eq!(result.different[0].host1_value, KeyList::from_keys(["ctrl", "m"]));
    assert_eq!(result.different[0].host2_value, KeyList::from_keys(["alt", "m"]));
}

#[test]
fn copy_home_from_ned_to_moe_upserts_row_with_ned_description() {
    let conn = setup();
    let mut service =
        JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();

    let outcome = service.copy("ned", "moe", &["home".to_string()]).unwrap();

    assert_eq!(outcome.copied, vec!["home".to_string()]);
    assert_eq!(
        service.value("moe", &"home".to_string()),
        Some(&KeyList::from_keys(["ctrl", "h"]))
    );
    let (keylist, description) = stored_row(&conn, "moe", "home");
    assert_eq!(keylist, r#"["ctrl","h"]"#);
    assert_eq!(description.as_deref(), Some("jump to home dir"));
}

#[test]
fn copy_overwrites_differing_value_and_description() {
    let conn = setup();
    let mut service =
        JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();

    service.copy("ned", "moe", &["mail".to_string()]).unwrap();

    let (keylist, description) = stored_row(&conn, "moe", "mail");
    assert_eq!(keylist, r#"["ctrl","m"]"#);
    assert_eq!(description.as_deref(), Some("open mail"));
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM jumppoints WHERE hostname = 'moe';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn copy_missing_source_value_fails() {
    let conn = setup();
    let mut service =
        JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();

    let err = service.copy("ned", "moe", &["work".to_string()]).unwrap_err();
    assert!(matches!(err, ReconcileError::MissingSource(slot) if slot == "work"));
}

#[test]
fn copy_fails_when_source_row_was_deleted_after_load() {
    let conn = setup();
    let mut service =
        JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();
    conn.execute(
        "DELETE FROM jumppoints WHERE hostname = 'ned' AND destination = 'home';",
        [],
    )
    .unwrap();

    let err = service.copy("ned", "moe", &["home".to_string()]).unwrap_err();

    assert!(matches!(err, ReconcileError::DependentReadFailure { .. }));
    assert_eq!(service.value("moe", &"home".to_string()), None);
    let store = SqliteConfigStore::try_new(&conn).unwrap();
    let moe_home = ConfigStore::<JumpPoints>::find_record(&store, "moe", &"home".to_string());
    assert!(moe_home.unwrap().is_none());
}

#[test]
fn reload_picks_up_rows_written_elsewhere() {
    let conn = setup();
    let mut service =
        JumpPointsService::load(SqliteConfigStore::try_new(&conn).unwrap()).unwrap();
    conn.execute(
        "INSERT INTO jumppoints (hostname, destination, keylist) VALUES ('bart', 'school', '[\"s\"]');",
        [],
    )
    .unwrap();

    assert!(matches!(
        service.compare("bart", "ned"),
        Err(ReconcileError::HostNotFound(_))
    ));

    service.reload().unwrap();
    assert_eq!(service.hosts(), ["bart", "moe", "ned"]);
    let result = service.compare("bart", "ned").unwrap();
    assert_eq!(result.only_host1[0].slot, "school");
}
