//! In-memory collaborators and database helpers for tests. Only compiled for tests, or with the `test_utils` feature.
mod memory_store;
#[cfg(feature = "sqlite")]
pub mod prepare_env;
mod recording_notifier;

pub use memory_store::{MemoryStore, StoreOp};
pub use recording_notifier::RecordingNotifier;
