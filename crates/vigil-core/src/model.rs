use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status carried by a monitoring event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

/// One reportable moment in a monitored command's life.
///
/// Built twice per invocation (start, finish) and never mutated after
/// construction. Field names are the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringEvent {
    pub job_name: String,
    pub status: RunStatus,
    /// Empty until the service assigns one on the start event.
    #[serde(default)]
    pub run_id: String,
    /// RFC3339 UTC.
    pub start_time: String,
    /// Present only on the finish event.
    pub end_time: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    /// Present only when status is `failed`.
    pub error_details: Option<String>,
    /// Opaque, passed through unvalidated.
    pub tags: Option<Value>,
    /// Present only when log capture is enabled.
    pub logs: Option<String>,
}

/// Single heartbeat ping for a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartbeatEvent {
    pub app: String,
    pub job_name: String,
    /// Unix epoch seconds.
    pub current_time: f64,
}

impl HeartbeatEvent {
    pub fn new(job_name: impl Into<String>, current_time: f64) -> Self {
        Self {
            app: "vigil".to_string(),
            job_name: job_name.into(),
            current_time,
        }
    }
}

/// Remote route an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Monitoring,
    Heartbeat,
}

impl Route {
    /// URL path on the remote service.
    pub fn path(self) -> &'static str {
        match self {
            Route::Monitoring => "/monitoring",
            Route::Heartbeat => "/heartbeat",
        }
    }

    /// Filename prefix used by the failure store.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Route::Monitoring => "monitoring",
            Route::Heartbeat => "heartbeat",
        }
    }

    /// Recovers the route from a stored filename without opening the file.
    pub fn from_file_name(name: &str) -> Option<Route> {
        if name.starts_with("monitoring_") {
            Some(Route::Monitoring)
        } else if name.starts_with("heartbeat_") {
            Some(Route::Heartbeat)
        } else {
            None
        }
    }
}

/// Response to a delivered start event.
///
/// Finish events are accepted idempotently and carry no identifier, so
/// `run_id` defaults to empty when the field is absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StartResponse {
    #[serde(default)]
    pub run_id: String,
}
