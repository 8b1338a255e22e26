//! Core semantic memory orchestrating embedding and vector storage.
//!
//! Provides a high-level API for saving, recalling, and answering questions
//! over stored memories, with automatic embedding generation through the
//! configured provider.

mod ask;
mod crud;
mod search;

// pub(crate): module internals hidden; public items re-exported explicitly via lib.rs
pub(crate) mod store;

pub use ask::Answer;
pub use store::SemanticMemory;

#[cfg(test)]
mod tests;
