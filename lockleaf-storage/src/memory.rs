//! In-memory backend for tests and ephemeral runs.

use crate::backend::{Backend, Revision};
use crate::error::BackendResult;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Holds the document in process memory. Clones share state, so a test can
/// hand one handle to the synchronizer and inspect the other.
#[derive(Clone)]
pub struct MemoryBackend {
    name: String,
    stored: Arc<Mutex<Option<Revision>>>,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> MemoryBackend {
        MemoryBackend {
            name: name.into(),
            stored: Arc::new(Mutex::new(None)),
        }
    }

    /// A backend seeded with an existing revision.
    pub fn holding(name: impl Into<String>, revision: Revision) -> MemoryBackend {
        let backend = MemoryBackend::new(name);
        *backend.stored.lock().unwrap() = Some(revision);
        backend
    }

    /// The currently stored revision.
    pub fn stored(&self) -> Option<Revision> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> BackendResult<Option<Revision>> {
        Ok(self.stored())
    }

    async fn write(&self, revision: &Revision) -> BackendResult<()> {
        *self.stored.lock().unwrap() = Some(revision.clone());
        Ok(())
    }
}
