//! Persistent storage.
//!
//! Currently a single `SQLite` table of LLM interactions, written by
//! [`LoggedLlmProvider`](crate::llm::LoggedLlmProvider) and read by `amem logs`.

// Dropping the connection guard early gains nothing for single statements.
#![allow(clippy::significant_drop_tightening)]

mod connection;
mod interaction_log;

pub use connection::{BUSY_TIMEOUT_MS, acquire_lock, configure_connection};
pub use interaction_log::{InteractionLog, InteractionRecord, InteractionSummary, NewInteraction};
