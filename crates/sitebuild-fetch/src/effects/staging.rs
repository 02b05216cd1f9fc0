use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Write sink that only becomes visible at the destination on commit.
///
/// Bytes go to a hidden `.<name>.part` sibling of the destination. Dropping
/// the sink without committing deletes the staging file.
pub(crate) struct StagedFile {
    staging:     PathBuf,
    destination: PathBuf,
    file:        Option<tokio::fs::File>,
    committed:   bool,
}

impl StagedFile {
    pub(crate) async fn create(destination: &Path) -> Result<Self> {
        let staging = staging_path(destination)?;
        let parent = staging.parent().unwrap_or(Path::new("."));
        tokio::fs::create_dir_all(parent).await.map_err(Error::io(parent))?;

        let file = tokio::fs::File::create(&staging).await.map_err(Error::io(&staging))?;

        Ok(Self {
            staging,
            destination: destination.to_path_buf(),
            file: Some(file),
            committed: false,
        })
    }

    pub(crate) fn path(&self) -> &Path { &self.staging }

    pub(crate) async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let staging = &self.staging;
        match self.file.as_mut() {
            Some(file) => file.write_all(chunk).await.map_err(Error::io(staging)),
            None => Err(Error::io(staging)(ErrorKind::BrokenPipe.into())),
        }
    }

    /// Flush, sync and rename the staging file over the destination.
    pub(crate) async fn commit(mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await.map_err(Error::io(&self.staging))?;
            file.sync_all().await.map_err(Error::io(&self.staging))?;
        }
        tokio::fs::rename(&self.staging, &self.destination)
            .await
            .map_err(Error::io(&self.destination))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            drop(self.file.take());
            let _ = std::fs::remove_file(&self.staging);
        }
    }
}

/// Hidden `.<name>.part` sibling that stages writes for `destination`.
pub(crate) fn staging_path(destination: &Path) -> Result<PathBuf> {
    let name = destination
        .file_name()
        .ok_or_else(|| Error::InvalidDestination(destination.to_path_buf()))?;
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(parent.join(format!(".{}.part", name.to_string_lossy())))
}

/// Remove `path` if it exists.
pub(crate) async fn discard(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed destination");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}
