use chrono::{SecondsFormat, Utc};

/// Current UTC time as an RFC3339 string, second resolution.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current unix epoch seconds as a float (heartbeat wire format).
pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
