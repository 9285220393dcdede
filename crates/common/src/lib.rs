//! Shared types for the shop order service.

mod types;

pub use types::{ParseIdError, RecordId};
