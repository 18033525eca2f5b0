//! Filesystem backend: the document as one file on a local or mounted path.

use crate::backend::{Backend, Revision};
use crate::error::BackendResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the document as a single file; the revision timestamp rides on the
/// file's modification time. Writes land in a sibling temp file and rename
/// into place, so a concurrent reader never observes a half-written
/// document.
pub struct FileBackend {
    name: String,
    path: PathBuf,
}

impl FileBackend {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> FileBackend {
        FileBackend {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> BackendResult<Option<Revision>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let metadata = tokio::fs::metadata(&self.path).await?;
        let modified_at: DateTime<Utc> = metadata.modified()?.into();
        debug!(
            "read {} bytes from {} (modified {modified_at})",
            bytes.len(),
            self.path.display()
        );
        Ok(Some(Revision { bytes, modified_at }))
    }

    async fn write(&self, revision: &Revision) -> BackendResult<()> {
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &revision.bytes).await?;

        // The revision timestamp becomes the file's mtime, so a repair write
        // carries the authoritative time rather than the local clock.
        let modified: std::time::SystemTime = revision.modified_at.into();
        let file = std::fs::OpenOptions::new().write(true).open(&tmp)?;
        file.set_modified(modified)?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            "wrote {} bytes to {}",
            revision.bytes.len(),
            self.path.display()
        );
        Ok(())
    }
}
