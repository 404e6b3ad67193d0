//! Reliable telemetry delivery: an HTTP client with bounded retries and
//! exponential backoff, a durable store for undeliverable events, and a
//! replay engine that re-attempts everything the store accumulated.

pub mod client;
pub mod error;
pub mod replay;
pub mod store;

pub use client::DeliveryClient;
pub use error::{DeliveryError, Result};
pub use replay::replay_all;
pub use store::{FailureStore, StoredFailure};
