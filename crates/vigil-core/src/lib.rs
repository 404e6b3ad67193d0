//! Shared models and pure policy for the vigil monitoring wrapper.

pub mod backoff;
pub mod logs;
pub mod model;
pub mod time;

pub use backoff::*;
pub use model::*;
pub use time::*;
