use std::sync::Arc;

use log::info;

use crate::config::{BackendKind, EngineConfig};
use crate::error::Result;

use super::{memory::MemoryBackend, sled_store::SledBackend};

/// One write inside an atomic batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// The contract the engine needs from an ordered byte-string store.
///
/// Keys are compared lexicographically as raw bytes. Every single operation is
/// expected to be crash-consistent on its own; [`KvBackend::apply_batch`] must
/// apply all of its operations or none of them.
///
/// Deleting a key that does not exist is not an error.
pub trait KvBackend: Send + Sync {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Visit every pair whose key starts with `prefix`, in key order, until
    /// `visit` returns `false`.
    fn iterate_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> bool,
    ) -> Result<()>;

    fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

pub fn open_backend(config: &EngineConfig) -> Result<Arc<dyn KvBackend>> {
    //! Open the backend the config asks for.

    match config.backend {
        BackendKind::Memory => {
            info!("using the in-memory backend; nothing will be persisted");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Sled => Ok(Arc::new(SledBackend::open(&config.data_dir)?)),
    }
}
