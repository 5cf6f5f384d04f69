#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use super::*;
use crate::models::{JarColor, JarIcon, NewJar};

fn make_jar(name: &str, target: Decimal) -> Jar {
    Jar::new(NewJar {
        name: name.into(),
        target_amount: target,
        color: JarColor::Teal,
        icon: JarIcon::House,
    })
    .unwrap()
}

fn sample_jars() -> Vec<Jar> {
    let mut vacation = make_jar("Vacation", dec!(2000));
    vacation.deposit(dec!(750), "bonus").unwrap();
    vacation.withdraw(dec!(100), "deposit on hotel").unwrap();
    let mut car = make_jar("New Car", dec!(15000.50));
    car.deposit(dec!(1234.56), "").unwrap();
    vec![vacation, car, make_jar("Rainy Day", dec!(500))]
}

// ── JSON file store ───────────────────────────────────────────

#[test]
fn test_fresh_install_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_json_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let jars = sample_jars();

    store.save(&jars).unwrap();
    let loaded = store.load();
    assert_eq!(loaded, jars);
    assert_eq!(loaded[0].current_amount, dec!(650));
    assert_eq!(loaded[0].transactions.len(), 2);
}

#[test]
fn test_save_replaces_previous_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    store.save(&sample_jars()).unwrap();
    store.save(&[make_jar("Only", dec!(10))]).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Only");
}

#[test]
fn test_save_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    store.save(&sample_jars()).unwrap();
    store.save(&sample_jars()).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["jars.json", "jars.json.bak"]);
}

#[test]
fn test_corrupt_file_falls_back_to_backup() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let jars = sample_jars();
    store.save(&jars).unwrap();

    std::fs::write(dir.path().join(json_file::FILE_NAME), b"[{\"id\": \"trunc").unwrap();
    assert_eq!(store.load(), jars);
}

#[test]
fn test_corrupt_file_without_backup_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(json_file::FILE_NAME), b"not json at all").unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_write_atomic_creates_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.json");
    write_atomic(&path, b"first").unwrap();
    write_atomic(&path, b"second").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"second");
}

#[test]
fn test_write_atomic_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("blob.json");
    let err = write_atomic(&path, b"x").unwrap_err();
    assert!(matches!(err, crate::errors::JarError::Persistence(_)));
}

// ── Legacy decoding ───────────────────────────────────────────

#[test]
fn test_epoch_dates_and_is_deposit_flag() {
    let id = uuid::Uuid::new_v4();
    let raw = json!([{
        "id": id,
        "name": "Old Jar",
        "targetAmount": 300,
        "currentAmount": 40,
        "creationDate": 700000000,
        "transactions": [
            {"amount": 50, "date": 700000100.5, "isDeposit": true},
            {"amount": 10, "date": "2023-04-01", "isDeposit": false}
        ]
    }]);
    let decoded = legacy::decode_bytes(raw.to_string().as_bytes()).unwrap();
    assert_eq!(decoded.skipped, 0);

    let jar = &decoded.jars[0];
    assert_eq!(jar.id, id);
    assert_eq!(jar.creation_date.timestamp(), 700_000_000);
    assert_eq!(jar.transactions[0].date.timestamp(), 700_000_100);
    assert_eq!(jar.transactions[1].amount, dec!(-10));
    assert_eq!(jar.current_amount, dec!(40));
    assert_eq!(jar.color, JarColor::Blue);
    assert_eq!(jar.icon, JarIcon::Banknote);
}

#[test]
fn test_balance_mismatch_appends_adjustment() {
    let raw = json!([{
        "id": uuid::Uuid::new_v4(),
        "name": "Drifted",
        "targetAmount": 100,
        "currentAmount": 80,
        "transactions": [{"amount": 50}]
    }]);
    let decoded = legacy::decode_bytes(raw.to_string().as_bytes()).unwrap();
    let jar = &decoded.jars[0];

    assert_eq!(jar.current_amount, dec!(80));
    assert_eq!(jar.transactions.len(), 2);
    assert_eq!(jar.transactions[1].amount, dec!(30));
    assert_eq!(jar.transactions[1].note, legacy::ADJUSTMENT_NOTE);
    assert!(jar.is_balanced());
}

#[test]
fn test_missing_current_amount_uses_history() {
    let raw = json!([{
        "id": uuid::Uuid::new_v4(),
        "name": "Sum Only",
        "targetAmount": "250.75",
        "transactions": [{"amount": 20.25}, {"amount": "4.75"}]
    }]);
    let decoded = legacy::decode_bytes(raw.to_string().as_bytes()).unwrap();
    assert_eq!(decoded.jars[0].target_amount, dec!(250.75));
    assert_eq!(decoded.jars[0].current_amount, dec!(25));
}

#[test]
fn test_bad_records_skipped_and_unknown_fields_ignored() {
    let raw = json!([
        {"id": uuid::Uuid::new_v4(), "name": "Good", "targetAmount": 10, "widgetKind": "large"},
        {"id": "not-a-uuid", "name": "Bad id", "targetAmount": 10},
        {"id": uuid::Uuid::new_v4(), "name": "   ", "targetAmount": 10},
        {"id": uuid::Uuid::new_v4(), "name": "Negative", "targetAmount": -5}
    ]);
    let decoded = legacy::decode_bytes(raw.to_string().as_bytes()).unwrap();
    assert_eq!(decoded.jars.len(), 1);
    assert_eq!(decoded.skipped, 3);
    assert!(!decoded.nothing_salvaged());
}

#[test]
fn test_unknown_tags_survive_decoding() {
    let raw = json!([{
        "id": uuid::Uuid::new_v4(),
        "name": "Legacy",
        "targetAmount": 10,
        "color": "indigo",
        "icon": "bicycle"
    }]);
    let decoded = legacy::decode_bytes(raw.to_string().as_bytes()).unwrap();
    assert_eq!(decoded.jars[0].color, JarColor::Other("indigo".into()));
    assert_eq!(decoded.jars[0].icon, JarIcon::Other("bicycle".into()));
}

#[test]
fn test_overflowing_history_skipped_not_panicking() {
    let good = uuid::Uuid::new_v4();
    let raw = format!(
        r#"[
            {{"id": "{}", "name": "Huge", "targetAmount": 1,
              "transactions": [{{"amount": 5e28}}, {{"amount": 5e28}}]}},
            {{"id": "{good}", "name": "Fine", "targetAmount": 10, "currentAmount": 3}}
        ]"#,
        uuid::Uuid::new_v4()
    );
    let decoded = legacy::decode_bytes(raw.as_bytes()).unwrap();
    assert_eq!(decoded.skipped, 1);
    assert_eq!(decoded.jars.len(), 1);
    assert_eq!(decoded.jars[0].id, good);
    assert_eq!(decoded.jars[0].current_amount, dec!(3));
}

#[test]
fn test_legacy_amounts_keep_every_digit() {
    let raw = format!(
        r#"[{{"id": "{}", "name": "Treasury", "targetAmount": 99999999999999.9999,
             "currentAmount": 12345678901234.5678,
             "transactions": [{{"amount": 12345678901234.5678}}]}}]"#,
        uuid::Uuid::new_v4()
    );
    let decoded = legacy::decode_bytes(raw.as_bytes()).unwrap();
    let jar = &decoded.jars[0];
    assert_eq!(jar.target_amount, dec!(99999999999999.9999));
    assert_eq!(jar.current_amount, dec!(12345678901234.5678));
    assert_eq!(jar.transactions.len(), 1);
}

#[test]
fn test_top_level_object_rejected() {
    assert!(legacy::decode_bytes(br#"{"jars": []}"#).is_err());
}

#[test]
fn test_parse_date_shapes() {
    assert!(legacy::parse_date("2024-03-01T10:00:00Z").is_some());
    assert!(legacy::parse_date("2024-03-01T10:00:00.250").is_some());
    assert!(legacy::parse_date("2024-03-01 10:00:00").is_some());
    assert_eq!(
        legacy::parse_date("2024-03-01").unwrap().to_rfc3339(),
        "2024-03-01T00:00:00+00:00"
    );
    assert_eq!(legacy::parse_date("86400").unwrap().timestamp(), 86_400);
    assert!(legacy::parse_date("yesterday").is_none());
}

#[test]
fn test_json_file_keeps_every_digit() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let mut jar = make_jar("Treasury", dec!(99999999999999.9999));
    jar.deposit(dec!(12345678901234.5678), "").unwrap();

    store.save(std::slice::from_ref(&jar)).unwrap();
    let text = std::fs::read_to_string(dir.path().join("jars.json")).unwrap();
    assert!(text.contains("12345678901234.5678"));
    assert!(!text.contains("12345678901234.568,"));
    assert_eq!(store.load(), vec![jar]);
}

#[test]
fn test_json_file_with_overflowing_jar_loads_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let raw = format!(
        r#"[
            {{"id": "{}", "name": "Huge", "targetAmount": 1,
              "transactions": [{{"amount": 5e28}}, {{"amount": 5e28}}]}},
            {{"id": "{}", "name": "Fine", "targetAmount": 10}}
        ]"#,
        uuid::Uuid::new_v4(),
        uuid::Uuid::new_v4()
    );
    std::fs::write(dir.path().join("jars.json"), raw).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Fine");
}

// ── Key-value store ───────────────────────────────────────────

#[test]
fn test_kv_empty_loads_empty() {
    let store = KvStore::open_in_memory().unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_kv_roundtrip_and_overwrite() {
    let store = KvStore::open_in_memory().unwrap();
    let jars = sample_jars();
    store.save(&jars).unwrap();
    assert_eq!(store.load(), jars);

    store.save(&jars[..1]).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_kv_garbage_value_loads_empty() {
    let store = KvStore::open_in_memory().unwrap();
    store.write_raw("{{{").unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_kv_reopen_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jars.db");
    let jars = sample_jars();
    {
        let store = KvStore::open(&path).unwrap();
        store.save(&jars).unwrap();
    }
    let store = KvStore::open(&path).unwrap();
    assert_eq!(store.load(), jars);
    assert_eq!(store.location(), path.display().to_string());
}

#[test]
fn test_kv_keeps_every_digit() {
    let store = KvStore::open_in_memory().unwrap();
    let mut jar = make_jar("Treasury", dec!(99999999999999.9999));
    jar.deposit(dec!(12345678901234.5678), "").unwrap();
    store.save(std::slice::from_ref(&jar)).unwrap();
    assert_eq!(store.load(), vec![jar]);
}

#[test]
fn test_kv_reopen_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jars.db");
    KvStore::open(&path).unwrap();
    KvStore::open(&path).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    let version: i32 = conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_kv_newer_schema_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jars.db");
    KvStore::open(&path).unwrap();
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("UPDATE schema_version SET version = 99", []).unwrap();
    }
    let err = KvStore::open(&path).err().unwrap();
    assert!(matches!(err, crate::errors::JarError::Persistence(_)));
}

#[test]
fn test_kv_failed_save_keeps_previous_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jars.db");
    let store = KvStore::open(&path).unwrap();
    let jars = sample_jars();
    store.save(&jars).unwrap();

    let locker = rusqlite::Connection::open(&path).unwrap();
    locker.execute_batch("BEGIN IMMEDIATE;").unwrap();
    assert!(store.save(&[]).is_err());
    locker.execute_batch("ROLLBACK;").unwrap();

    assert_eq!(store.load(), jars);
    store.save(&jars[..1]).unwrap();
    assert_eq!(store.load().len(), 1);
}

// ── Memory store ──────────────────────────────────────────────

#[test]
fn test_memory_store_failure_keeps_previous() {
    let store = MemoryStore::with(sample_jars());
    store.fail_saves.set(true);
    assert!(store.save(&[]).is_err());
    assert_eq!(store.load().len(), 3);
    assert_eq!(store.saves.get(), 0);
}
