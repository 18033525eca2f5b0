//! The multi-backend synchronizer.
//!
//! Reads every backend concurrently, picks the newest revision as
//! authoritative, repairs replicas that disagree, and writes to all.
//! Selection is a pure maximum over timestamps: adding or removing a
//! backend, or reordering completions, never changes the chosen revision
//! for a fixed snapshot of backend states.

use crate::backend::{Backend, Revision};
use crate::error::{BackendError, BackendFailure, StorageError, StorageResult};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Coordinates a fixed set of independent backends.
#[derive(Clone)]
pub struct Synchronizer {
    backends: Vec<Arc<dyn Backend>>,
}

/// Result of a read over the whole backend set.
#[derive(Debug)]
pub struct ReadOutcome {
    /// The authoritative revision, or `None` when no backend holds a
    /// document (fresh install, not an error).
    pub revision: Option<Revision>,
    /// Read and repair failures that did not prevent the read. Collected,
    /// logged, and reported here rather than raised.
    pub failures: Vec<BackendFailure>,
}

impl Synchronizer {
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Synchronizer {
        Synchronizer { backends }
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Reads all backends concurrently and converges them.
    ///
    /// Every backend is awaited before selection; a slow backend adds
    /// latency, never wrong answers. Stale and empty replicas are repaired
    /// with the authoritative revision before this returns, so read latency
    /// includes replication-repair time. One backend with content is enough
    /// for the read to succeed; only a total read failure is an error.
    pub async fn read(&self) -> StorageResult<ReadOutcome> {
        let reads = join_all(
            self.backends
                .iter()
                .enumerate()
                .map(|(index, backend)| async move { (index, backend.read().await) }),
        )
        .await;

        let mut holders: Vec<(usize, Revision)> = Vec::new();
        let mut empty: Vec<usize> = Vec::new();
        let mut failures: Vec<BackendFailure> = Vec::new();
        for (index, result) in reads {
            let backend = &self.backends[index];
            match result {
                Ok(Some(revision)) => holders.push((index, revision)),
                Ok(None) => empty.push(index),
                Err(error @ BackendError::Ambiguous { .. }) => {
                    // Several candidate documents behind one backend: a
                    // repair could converge everything onto the wrong one.
                    return Err(StorageError::Ambiguous(BackendFailure {
                        backend: backend.name().to_string(),
                        error,
                    }));
                }
                Err(error) => {
                    warn!("read from backend {} failed: {error}", backend.name());
                    failures.push(BackendFailure {
                        backend: backend.name().to_string(),
                        error,
                    });
                }
            }
        }

        let newest = holders
            .iter()
            .max_by_key(|(_, revision)| revision.modified_at)
            .map(|(index, revision)| (*index, revision.clone()));
        let Some((source, authoritative)) = newest else {
            if !failures.is_empty() && failures.len() == self.backends.len() {
                return Err(StorageError::NoUsableBackend { failures });
            }
            debug!("no backend holds a document");
            return Ok(ReadOutcome {
                revision: None,
                failures,
            });
        };

        // Repair replicas with a definitive stale state: holders whose bytes
        // differ from the authoritative ones, and backends holding nothing.
        // A backend whose read failed is left alone; its failure is already
        // reported and the next successful read repairs it.
        let mut stale: Vec<usize> = empty;
        for (index, revision) in &holders {
            if *index != source && revision.bytes != authoritative.bytes {
                stale.push(*index);
            }
        }

        if !stale.is_empty() {
            debug!(
                "repairing {} of {} backends from {}",
                stale.len(),
                self.backends.len(),
                self.backends[source].name()
            );
            let authoritative = &authoritative;
            let repairs = join_all(stale.into_iter().map(|index| {
                let backend = &self.backends[index];
                async move { (index, backend.write(authoritative).await) }
            }))
            .await;
            for (index, result) in repairs {
                if let Err(error) = result {
                    let backend = self.backends[index].name();
                    warn!("repair write to backend {backend} failed: {error}");
                    failures.push(BackendFailure {
                        backend: backend.to_string(),
                        error,
                    });
                }
            }
        }

        Ok(ReadOutcome {
            revision: Some(authoritative),
            failures,
        })
    }

    /// Writes `bytes` to every backend, stamped with the current time.
    ///
    /// All writes run concurrently and all are awaited. Any failure is
    /// reported as [`StorageError::PartialWriteFailure`]; backends that
    /// succeeded keep the new content; there is no cross-backend rollback
    /// and no retry.
    pub async fn write(&self, bytes: Vec<u8>) -> StorageResult<Revision> {
        let revision = Revision {
            bytes,
            modified_at: Utc::now(),
        };

        let results = {
            let revision = &revision;
            join_all(
                self.backends
                    .iter()
                    .map(|backend| async move { (backend, backend.write(revision).await) }),
            )
            .await
        };

        let mut failures = Vec::new();
        for (backend, result) in results {
            if let Err(error) = result {
                warn!("write to backend {} failed: {error}", backend.name());
                failures.push(BackendFailure {
                    backend: backend.name().to_string(),
                    error,
                });
            }
        }
        if !failures.is_empty() {
            return Err(StorageError::PartialWriteFailure {
                total: self.backends.len(),
                failures,
            });
        }

        debug!(
            "wrote {} bytes to {} backends",
            revision.bytes.len(),
            self.backends.len()
        );
        Ok(revision)
    }
}
