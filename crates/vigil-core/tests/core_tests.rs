//! Integration tests for the core crate.

use vigil_core::{HeartbeatEvent, MonitoringEvent, Route, RunStatus, StartResponse};

fn start_event() -> MonitoringEvent {
    MonitoringEvent {
        job_name: "nightly-etl".into(),
        status: RunStatus::Running,
        run_id: String::new(),
        start_time: "2026-08-29T10:00:00Z".into(),
        end_time: None,
        metadata: None,
        error_details: None,
        tags: None,
        logs: None,
    }
}

#[test]
fn test_run_status_wire_names() {
    assert_eq!(serde_json::to_string(&RunStatus::Running).unwrap(), r#""running""#);
    assert_eq!(serde_json::to_string(&RunStatus::Success).unwrap(), r#""success""#);
    assert_eq!(serde_json::to_string(&RunStatus::Failed).unwrap(), r#""failed""#);
}

#[test]
fn test_monitoring_event_wire_fields() {
    let json = serde_json::to_value(start_event()).unwrap();
    let obj = json.as_object().unwrap();
    for field in [
        "job_name",
        "status",
        "run_id",
        "start_time",
        "end_time",
        "metadata",
        "error_details",
        "tags",
        "logs",
    ] {
        assert!(obj.contains_key(field), "missing wire field {field}");
    }
    assert_eq!(obj["run_id"], "");
    assert!(obj["end_time"].is_null());
}

#[test]
fn test_monitoring_event_round_trip() {
    let event = start_event();
    let json = serde_json::to_string(&event).unwrap();
    let back: MonitoringEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn test_heartbeat_event_app_tag() {
    let hb = HeartbeatEvent::new("nightly-etl", 1_756_000_000.5);
    let json = serde_json::to_value(&hb).unwrap();
    assert_eq!(json["app"], "vigil");
    assert_eq!(json["job_name"], "nightly-etl");
}

#[test]
fn test_route_paths_and_prefixes() {
    assert_eq!(Route::Monitoring.path(), "/monitoring");
    assert_eq!(Route::Heartbeat.path(), "/heartbeat");
    assert_eq!(Route::Monitoring.file_prefix(), "monitoring");
    assert_eq!(Route::Heartbeat.file_prefix(), "heartbeat");
}

#[test]
fn test_route_from_file_name() {
    assert_eq!(
        Route::from_file_name("monitoring_1756000000000000000.json"),
        Some(Route::Monitoring)
    );
    assert_eq!(
        Route::from_file_name("heartbeat_1756000000000000000.json"),
        Some(Route::Heartbeat)
    );
    assert_eq!(Route::from_file_name("notes.txt"), None);
    assert_eq!(Route::from_file_name("monitoring"), None);
}

#[test]
fn test_start_response_tolerates_missing_run_id() {
    let resp: StartResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(resp.run_id, "");

    let resp: StartResponse = serde_json::from_str(r#"{"run_id":"run-7"}"#).unwrap();
    assert_eq!(resp.run_id, "run-7");
}
