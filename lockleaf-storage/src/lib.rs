//! Replicated backend storage for Lockleaf.
//!
//! A fixed set of independent backends each hold one copy of the encrypted
//! document. The synchronizer reads them all concurrently, treats the
//! newest revision as authoritative, repairs replicas that lag, and writes
//! to all of them. Backends promise nothing about each other; convergence
//! is this crate's job.
//!
//! The bytes moving through here are opaque; decoding them into a message
//! is layered above (see `lockleaf-vault`), so a decode failure stays
//! distinct from backend I/O failure.

mod backend;
mod config;
mod error;
mod file;
mod memory;
mod sync;

pub use backend::{Backend, Revision};
pub use config::{DOCUMENT_NAME, StorageConfig};
pub use error::{BackendError, BackendFailure, BackendResult, StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sync::{ReadOutcome, Synchronizer};
