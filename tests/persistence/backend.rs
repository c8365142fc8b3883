use std::sync::Arc;

use rucks_engine::config::{BackendKind, EngineConfig};
use rucks_engine::storage::{BatchOp, KvBackend, MemoryBackend, SledBackend, open_backend};

fn _collect_prefix(backend: &dyn KvBackend, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut seen = vec![];
    backend
        .iterate_prefix(prefix, &mut |key: &[u8], value: &[u8]| {
            seen.push((key.to_vec(), value.to_vec()));
            true
        })
        .unwrap();
    seen
}

fn _exercise(backend: &dyn KvBackend) {
    backend.put(b"b_2", b"two").unwrap();
    backend.put(b"b_1", b"one").unwrap();
    backend.put(b"a_1", b"other").unwrap();
    backend.put(b"c_1", b"other").unwrap();

    assert_eq!(backend.get(b"b_1").unwrap(), Some(b"one".to_vec()));
    assert_eq!(backend.get(b"missing").unwrap(), None);

    assert_eq!(
        _collect_prefix(backend, b"b_"),
        vec![
            (b"b_1".to_vec(), b"one".to_vec()),
            (b"b_2".to_vec(), b"two".to_vec()),
        ]
    );

    backend.delete(b"b_1").unwrap();
    backend.delete(b"never_there").unwrap();
    assert_eq!(backend.get(b"b_1").unwrap(), None);

    backend
        .apply_batch(vec![
            BatchOp::Put(b"b_3".to_vec(), b"three".to_vec()),
            BatchOp::Delete(b"b_2".to_vec()),
        ])
        .unwrap();
    assert_eq!(
        _collect_prefix(backend, b"b_"),
        vec![(b"b_3".to_vec(), b"three".to_vec())]
    );
}

#[test]
fn backend_memory_contract() {
    _exercise(&MemoryBackend::new());
}

#[test]
fn backend_sled_contract() {
    let dir = tempfile::tempdir().unwrap();
    _exercise(&SledBackend::open(dir.path()).unwrap());
}

#[test]
fn backend_iterate_prefix_stops_when_asked() {
    let backend = MemoryBackend::new();
    for i in 0..10u8 {
        backend.put(&[b'k', i], &[i]).unwrap();
    }

    let mut visited = 0;
    backend
        .iterate_prefix(b"k", &mut |_: &[u8], _: &[u8]| {
            visited += 1;
            visited < 3
        })
        .unwrap();

    assert_eq!(visited, 3);
}

#[test]
fn backend_open_follows_the_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        data_dir: dir.path().join("store"),
        backend: BackendKind::Sled,
        ..EngineConfig::default()
    };

    {
        let backend: Arc<dyn KvBackend> = open_backend(&config).unwrap();
        backend.put(b"kept", b"yes").unwrap();
        backend.flush().unwrap();
    }

    let backend = open_backend(&config).unwrap();
    assert_eq!(backend.get(b"kept").unwrap(), Some(b"yes".to_vec()));

    let memory = open_backend(&EngineConfig {
        backend: BackendKind::Memory,
        ..EngineConfig::default()
    })
    .unwrap();
    assert_eq!(memory.get(b"kept").unwrap(), None);
}
