//! Start event, wrapped command, finish event — with every delivery
//! failure routed into the durable failure store.

use std::process::Stdio;

use anyhow::Result;
use serde_json::{Map, Value};
use vigil_client::{DeliveryClient, FailureStore};
use vigil_core::{
    logs, now_epoch_secs, now_rfc3339, HeartbeatEvent, MonitoringEvent, Route, RunStatus,
};

use crate::capture::tee;

/// Finish events carry at most this many trailing bytes of combined
/// stdout + stderr.
pub const MAX_LOG_BYTES: usize = 200_000;

/// Options for one monitored invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Job name reported to the service.
    pub job_name: String,
    /// Duplicate the command's output into the finish event.
    pub capture_logs: bool,
    /// Arbitrary JSON object merged verbatim into both events.
    pub metadata: Option<Map<String, Value>>,
    /// Opaque JSON passed through unvalidated.
    pub tags: Option<Value>,
    /// Program and arguments, invoked verbatim (no shell).
    pub command: Vec<String>,
}

/// Monitoring state for one run, threaded explicitly through the steps.
#[derive(Debug, Default)]
struct Session {
    /// The start event reached the service.
    ready: bool,
    /// Identifier assigned by the service; required for the finish event.
    run_id: Option<String>,
    /// The start event has already been durably saved.
    start_saved: bool,
}

pub struct Runner {
    client: DeliveryClient,
    store: FailureStore,
}

impl Runner {
    pub fn new(client: DeliveryClient, store: FailureStore) -> Self {
        Self { client, store }
    }

    /// Runs the wrapped command under monitoring and returns its exit
    /// code. Monitoring failures never prevent the command from running
    /// and never change the code returned here.
    pub async fn run(&self, opts: &RunOptions) -> Result<i32> {
        let start_time = now_rfc3339();
        let start_event = MonitoringEvent {
            job_name: opts.job_name.clone(),
            status: RunStatus::Running,
            run_id: String::new(),
            start_time: start_time.clone(),
            end_time: None,
            metadata: opts.metadata.clone(),
            error_details: None,
            tags: opts.tags.clone(),
            logs: None,
        };

        let mut session = Session::default();
        match self.client.send(Route::Monitoring, &start_event).await {
            Ok(resp) => {
                session.ready = true;
                if resp.run_id.is_empty() {
                    tracing::warn!("service accepted the start event but assigned no run id");
                } else {
                    session.run_id = Some(resp.run_id);
                }
                println!("✓ connected, job \"{}\" registered", opts.job_name);
            }
            Err(err) => {
                eprintln!("✗ {err}");
                session.start_saved = self.save_or_report(&start_event, "start");
            }
        }

        if opts.capture_logs {
            println!("✓ capturing logs");
        }

        let (exit_code, error_details, captured) = self.run_child(opts).await;

        let end_time = now_rfc3339();
        let status = if error_details.is_none() {
            RunStatus::Success
        } else {
            RunStatus::Failed
        };
        // The cut is at a byte boundary, not a char boundary; a multibyte
        // sequence split at the cut becomes U+FFFD. The byte cap is the
        // wire contract, so keep the slice as-is.
        let logs_field = opts
            .capture_logs
            .then(|| String::from_utf8_lossy(logs::tail(&captured, MAX_LOG_BYTES)).into_owned());

        // The finish event requires the run id assigned by the start event;
        // without one it is never sent.
        if session.ready && session.run_id.is_some() {
            let finish_event = MonitoringEvent {
                job_name: opts.job_name.clone(),
                status,
                run_id: session.run_id.clone().unwrap_or_default(),
                start_time,
                end_time: Some(end_time),
                metadata: opts.metadata.clone(),
                error_details,
                tags: opts.tags.clone(),
                logs: logs_field,
            };
            match self.client.send(Route::Monitoring, &finish_event).await {
                Ok(_) => println!("✓ monitoring complete"),
                Err(err) => {
                    eprintln!("✗ failed to deliver finish event: {err}");
                    self.save_or_report(&finish_event, "finish");
                }
            }
        } else {
            if !session.ready && !session.start_saved {
                session.start_saved = self.save_or_report(&start_event, "start");
            }
            eprintln!("monitoring never engaged for this run");
        }

        Ok(exit_code)
    }

    /// Persists an undeliverable event, telling the user either where it
    /// went or that it is lost. Returns whether persistence succeeded.
    fn save_or_report(&self, event: &MonitoringEvent, which: &str) -> bool {
        match self.store.save(Route::Monitoring, event) {
            Ok(path) => {
                eprintln!("  {which} event stored for replay at {}", path.display());
                true
            }
            Err(err) => {
                eprintln!("  could not store {which} event, it is lost: {err:#}");
                false
            }
        }
    }

    /// Spawns the wrapped command, optionally teeing its output to the
    /// console and in-memory buffers concurrently with the wait. Capture
    /// completes before this returns.
    async fn run_child(&self, opts: &RunOptions) -> (i32, Option<String>, Vec<u8>) {
        let Some((program, args)) = opts.command.split_first() else {
            return (1, Some("no command given".to_string()), Vec::new());
        };

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        if opts.capture_logs {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => return (1, Some(format!("spawn failed: {err}")), Vec::new()),
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_fut = async {
            match stdout {
                Some(s) => tee(s, tokio::io::stdout()).await,
                None => Vec::new(),
            }
        };
        let err_fut = async {
            match stderr {
                Some(s) => tee(s, tokio::io::stderr()).await,
                None => Vec::new(),
            }
        };
        let (mut captured, err_bytes, status) = tokio::join!(out_fut, err_fut, child.wait());
        captured.extend_from_slice(&err_bytes);

        match status {
            Ok(s) if s.success() => (0, None, captured),
            Ok(s) => (
                s.code().unwrap_or(1),
                Some(format!("command exited with {s}")),
                captured,
            ),
            Err(err) => (1, Some(format!("wait failed: {err}")), captured),
        }
    }
}

/// Sends a single heartbeat for `job_name`. On delivery failure the event
/// is persisted under the heartbeat prefix and the error is returned.
pub async fn send_heartbeat(
    client: &DeliveryClient,
    store: &FailureStore,
    job_name: &str,
) -> Result<()> {
    let event = HeartbeatEvent::new(job_name, now_epoch_secs());
    if let Err(err) = client.send(Route::Heartbeat, &event).await {
        match store.save(Route::Heartbeat, &event) {
            Ok(path) => eprintln!("✗ heartbeat stored for replay at {}", path.display()),
            Err(save_err) => eprintln!("✗ could not store heartbeat, it is lost: {save_err:#}"),
        }
        return Err(err.into());
    }
    Ok(())
}
