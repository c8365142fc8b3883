use std::{collections::BTreeMap, sync::Arc};

use log::{debug, warn};

use crate::error::{Error, Result};

use super::backend::{BatchOp, KvBackend};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

/// A set of buffered writes that reach the backend as one atomic batch.
///
/// Reads go to the pending writes first, so a transaction sees its own puts and
/// deletes. Nothing is visible to anyone else until [`Transaction::commit`].
///
/// The transaction does not detect conflicting writers. Callers that
/// read-modify-write a key hold their own lock around the whole transaction
/// (see [`crate::persistence::Table`]).
pub struct Transaction {
    backend: Arc<dyn KvBackend>,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    state: TransactionState,
}

impl Transaction {
    pub fn begin(backend: &Arc<dyn KvBackend>) -> Transaction {
        Transaction {
            backend: Arc::clone(backend),
            pending: BTreeMap::new(),
            state: TransactionState::Active,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_active()?;
        match self.pending.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.backend.get(key),
        }
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.pending.insert(key.to_vec(), None);
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        //! Apply every pending write in one batch. The transaction is closed
        //! whether or not the backend accepts the batch.

        self.ensure_active()?;
        let ops: Vec<BatchOp> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOp::Put(key, value),
                None => BatchOp::Delete(key),
            })
            .collect();

        self.state = TransactionState::Committed;
        debug!("committing transaction with {} operation(s)", ops.len());
        self.backend.apply_batch(ops)
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.pending.clear();
        self.state = TransactionState::RolledBack;
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::TransactionClosed)
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.is_active() && !self.pending.is_empty() {
            warn!(
                "transaction dropped while active; discarding {} pending write(s)",
                self.pending.len()
            );
        }
    }
}
