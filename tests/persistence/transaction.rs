use std::sync::Arc;

use rucks_engine::Error;
use rucks_engine::storage::{KvBackend, MemoryBackend, Transaction, TransactionState};

fn _backend() -> (Arc<MemoryBackend>, Arc<dyn KvBackend>) {
    let memory = Arc::new(MemoryBackend::new());
    let backend: Arc<dyn KvBackend> = memory.clone();
    (memory, backend)
}

#[test]
fn transaction_commit_applies_every_write() {
    let (memory, backend) = _backend();
    backend.put(b"gone", b"x").unwrap();

    let mut txn = Transaction::begin(&backend);
    txn.put(b"a", b"1").unwrap();
    txn.put(b"b", b"2").unwrap();
    txn.delete(b"gone").unwrap();

    // Nothing is visible before commit.
    assert_eq!(backend.get(b"a").unwrap(), None);
    assert_eq!(txn.pending_len(), 3);

    txn.commit().unwrap();
    assert_eq!(txn.state(), TransactionState::Committed);
    assert_eq!(backend.get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(backend.get(b"gone").unwrap(), None);
    assert_eq!(memory.len(), 2);
}

#[test]
fn transaction_reads_its_own_writes() {
    let (_, backend) = _backend();
    backend.put(b"k", b"old").unwrap();
    backend.put(b"d", b"present").unwrap();

    let mut txn = Transaction::begin(&backend);
    txn.put(b"k", b"new").unwrap();
    txn.delete(b"d").unwrap();

    assert_eq!(txn.get(b"k").unwrap(), Some(b"new".to_vec()));
    assert_eq!(txn.get(b"d").unwrap(), None);
    assert_eq!(backend.get(b"k").unwrap(), Some(b"old".to_vec()));

    txn.rollback().unwrap();
}

#[test]
fn transaction_rollback_discards_writes() {
    let (memory, backend) = _backend();

    let mut txn = Transaction::begin(&backend);
    txn.put(b"a", b"1").unwrap();
    txn.rollback().unwrap();

    assert_eq!(txn.state(), TransactionState::RolledBack);
    assert!(memory.is_empty());
}

#[test]
fn transaction_closed_rejects_further_use() {
    let (_, backend) = _backend();

    let mut txn = Transaction::begin(&backend);
    txn.commit().unwrap();

    assert!(matches!(txn.put(b"a", b"1"), Err(Error::TransactionClosed)));
    assert!(matches!(txn.get(b"a"), Err(Error::TransactionClosed)));
    assert!(matches!(txn.commit(), Err(Error::TransactionClosed)));
    assert!(matches!(txn.rollback(), Err(Error::TransactionClosed)));
}

#[test]
fn transaction_dropped_without_commit_writes_nothing() {
    let (memory, backend) = _backend();

    {
        let mut txn = Transaction::begin(&backend);
        txn.put(b"a", b"1").unwrap();
    }

    assert!(memory.is_empty());
}
