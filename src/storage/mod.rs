//! The key-value side of the engine.
//!
//! - Backend (the narrow contract every key-value engine has to satisfy)
//! - Memory and sled backends
//! - Transaction (buffered writes committed as one atomic batch)

mod backend;
mod memory;
mod sled_store;
mod transaction;

//  External API
pub use backend::{BatchOp, KvBackend, open_backend};
pub use memory::MemoryBackend;
pub use sled_store::SledBackend;
pub use transaction::{Transaction, TransactionState};
