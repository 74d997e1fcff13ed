use bytes::Bytes;
use jotpad_storage::{FilesystemBackend, MemoryBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Generate deterministic test data using a seeded pseudo-random generator.
/// Same seed produces same output.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// One instance of every backend, sharing a public base URL.
///
/// The temp dir is held so the filesystem root outlives the test.
#[allow(dead_code)]
pub struct Backends {
    _dir: TempDir,
    pub all: Vec<Arc<dyn ObjectStore>>,
}

#[allow(dead_code)]
impl Backends {
    pub async fn new(public_base_url: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let filesystem =
            FilesystemBackend::new(dir.path().join("blobs"), Some(public_base_url.to_string()))
                .await
                .unwrap();
        let memory = MemoryBackend::new(Some(public_base_url.to_string()));
        Self {
            _dir: dir,
            all: vec![Arc::new(filesystem), Arc::new(memory)],
        }
    }
}
