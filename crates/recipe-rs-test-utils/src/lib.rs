//! Test helpers shared across recipe crates.

pub mod store;

pub use store::{FailingStore, RecordingStore, StoreCall, in_memory_store, sample_attributes};
