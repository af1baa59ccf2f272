mod support;

use support::setup_db;

#[test]
fn insert_usage_assigns_increasing_ids() {
    let test_db = setup_db();
    let db = &test_db.db;
    let first = db
        .insert_usage("3", "2025-03-01T14:05:00.000Z", 12.5, Some("Job A"))
        .expect("insert");
    let second = db
        .insert_usage("3", "2025-03-01T14:45:00.000Z", 7.0, None)
        .expect("insert");
    assert!(second > first);
    assert_eq!(db.count_usage().expect("count"), 2);
}

#[test]
fn list_all_usage_orders_descending_by_used_at() {
    let test_db = setup_db();
    let db = &test_db.db;
    db.insert_usage("1", "2025-03-01T10:00:00.000Z", 5.0, None)
        .expect("insert");
    db.insert_usage("2", "2025-03-02T10:00:00.000Z", 8.0, Some("later"))
        .expect("insert");
    db.insert_usage("1", "2025-03-01T12:00:00.000Z", 3.0, None)
        .expect("insert");

    let rows = db.list_all_usage().expect("list");
    let stamps: Vec<&str> = rows.iter().map(|row| row.used_at.as_str()).collect();
    assert_eq!(
        stamps,
        vec![
            "2025-03-02T10:00:00.000Z",
            "2025-03-01T12:00:00.000Z",
            "2025-03-01T10:00:00.000Z"
        ]
    );
}

#[test]
fn list_usage_for_spool_filters_and_keeps_note() {
    let test_db = setup_db();
    let db = &test_db.db;
    db.insert_usage("1", "2025-03-01T10:00:00.000Z", 5.0, Some("benchy"))
        .expect("insert");
    db.insert_usage("2", "2025-03-01T11:00:00.000Z", 8.0, None)
        .expect("insert");

    let rows = db.list_usage_for_spool("1").expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].spool_id, "1");
    assert_eq!(rows[0].note.as_deref(), Some("benchy"));
    assert!((rows[0].weight - 5.0).abs() < 1e-9);
}

#[test]
fn list_usage_for_unknown_spool_is_empty() {
    let test_db = setup_db();
    assert!(test_db.db.list_usage_for_spool("99").expect("list").is_empty());
}
