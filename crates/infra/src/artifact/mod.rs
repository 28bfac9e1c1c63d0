//! Trained-artifact storage.
//!
//! Both stores hold encoded bytes and decode on load, so the in-memory store
//! exercises exactly the same (de)serialization path as the file store.

pub mod file;
pub mod in_memory;

pub use file::FileArtifactStore;
pub use in_memory::InMemoryArtifactStore;
