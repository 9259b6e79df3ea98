//! Storage backends that live outside the database.
//!
//! `MemoryStore` implements every repository trait of the crate over one
//! lock; router tests and the doc examples run against it.

pub mod memory;

pub use memory::MemoryStore;
