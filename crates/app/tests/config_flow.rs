use spool_app::{AppError, AppState};
use tempfile::tempdir;

#[test]
fn config_update_strips_versioned_suffix_and_persists() {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("app.sqlite");
    let state = AppState::new(db_path.clone());
    state.initialize().expect("initialize");

    let settings = state
        .services
        .config
        .update(Some("http://h:1/api/v1"), None)
        .expect("update");
    assert_eq!(settings.spoolman_url, "http://h:1");
    // Untouched field keeps its default.
    assert!((settings.flow_compensation_g - 1.5).abs() < 1e-9);

    // A fresh state over the same DB loads the persisted value at startup.
    let reopened = AppState::new(db_path);
    reopened.initialize().expect("initialize again");
    assert_eq!(reopened.services.config.snapshot().spoolman_url, "http://h:1");
}

#[test]
fn partial_update_touches_only_the_given_field() {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(dir.path().join("app.sqlite"));
    state.initialize().expect("initialize");

    state
        .services
        .config
        .update(Some("http://printer-pi:7912"), None)
        .expect("set url");
    let settings = state
        .services
        .config
        .update(None, Some(2.0))
        .expect("set flow");
    assert_eq!(settings.spoolman_url, "http://printer-pi:7912");
    assert!((settings.flow_compensation_g - 2.0).abs() < 1e-9);
}

#[test]
fn blank_url_is_rejected_before_any_write() {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(dir.path().join("app.sqlite"));
    state.initialize().expect("initialize");

    let err = state
        .services
        .config
        .update(Some("   "), Some(3.0))
        .expect_err("blank url");
    assert!(matches!(err, AppError::InvalidInput(_)));

    // Validation precedes side effects: neither field was written.
    let db = state.open_db().expect("open db");
    assert_eq!(db.get_spoolman_url().expect("get url"), None);
    assert_eq!(db.get_flow_compensation().expect("get flow"), None);
    let snapshot = state.services.config.snapshot();
    assert!((snapshot.flow_compensation_g - 1.5).abs() < 1e-9);
}
