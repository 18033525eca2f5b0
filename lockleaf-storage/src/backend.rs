//! The backend contract.

use crate::error::BackendResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A document revision held by (or destined for) a backend.
///
/// The timestamp is the only ordering relationship backends have to each
/// other; the synchronizer treats the maximum as authoritative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    pub bytes: Vec<u8>,
    pub modified_at: DateTime<Utc>,
}

/// An independent storage endpoint holding one logical document under a
/// fixed well-known name.
///
/// Implementations may be slow, flaky, or stale; the synchronizer reads all
/// of them, repairs the ones that lag, and reports every failure. How a
/// concrete backend authenticates (tokens, OAuth) is entirely outside this
/// contract.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stable name used in logs and aggregated error reports.
    fn name(&self) -> &str;

    /// Reads the stored document, or `None` if the backend holds nothing.
    async fn read(&self) -> BackendResult<Option<Revision>>;

    /// Replaces the stored document with `revision`.
    async fn write(&self, revision: &Revision) -> BackendResult<()>;
}
