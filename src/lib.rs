//! Typed, row-oriented tables stored on top of an ordered key-value engine.
//!
//! The crate is split into the following parts
//! - storage (the key-value contract, its backends and write transactions)
//! - persistence (row codec, schema registry, row storage, tables and the catalog)
//! - functions (the table-function contract and the scalar entry points)
//! - cli and sessions (a small SQL client that drives everything end to end)

pub mod cli;
pub mod config;
pub mod error;
pub mod functions;
pub mod persistence;
pub mod sessions;
pub mod storage;

pub use error::{Error, Result};
