//! Storage configuration.

use crate::backend::Backend;
use crate::file::FileBackend;
use crate::sync::Synchronizer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Well-known logical name of the stored document on every backend.
pub const DOCUMENT_NAME: &str = "lockleaf.json";

/// Configuration for the replicated store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Logical document name (the file name on file backends).
    pub document_name: String,

    /// Directories that each hold one replica of the document, typically a
    /// local data dir plus one or more synced mounts.
    pub replica_dirs: Vec<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            document_name: DOCUMENT_NAME.to_string(),
            replica_dirs: Vec::new(),
        }
    }
}

impl StorageConfig {
    /// Builds a synchronizer with one file backend per replica directory,
    /// named after the directory for logs and error reports.
    pub fn build(&self) -> Synchronizer {
        let backends: Vec<Arc<dyn Backend>> = self
            .replica_dirs
            .iter()
            .map(|dir| {
                Arc::new(FileBackend::new(
                    dir.display().to_string(),
                    dir.join(&self.document_name),
                )) as Arc<dyn Backend>
            })
            .collect();
        Synchronizer::new(backends)
    }
}
