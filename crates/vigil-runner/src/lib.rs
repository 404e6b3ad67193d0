//! Instrumentation orchestrator: runs a command under monitoring, routing
//! delivery failures into the durable failure store.

pub mod capture;
pub mod runner;

pub use runner::{send_heartbeat, RunOptions, Runner, MAX_LOG_BYTES};
