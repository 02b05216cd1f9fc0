use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What to do with a symbolic link found inside a source tree.
///
/// Links are never followed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Leave the link out of the output and log a warning.
    #[default]
    Skip,
    /// Abort the copy with [`Error::Symlink`].
    Error,
}

/// Counters accumulated by a recursive copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files:   u64,
    pub dirs:    u64,
    pub skipped: u64,
    pub bytes:   u64,
}

impl CopyStats {
    pub fn merge(&mut self, other: CopyStats) {
        self.files += other.files;
        self.dirs += other.dirs;
        self.skipped += other.skipped;
        self.bytes += other.bytes;
    }
}

/// Recursively copy the contents of `src` into `dest`.
///
/// `dest` is created if needed. Regular files overwrite whatever file is
/// already at the same relative path; directories are merged. Entries are
/// visited one at a time in directory order.
pub fn copy_dir_all(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    symlinks: SymlinkPolicy,
) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    copy_into(src.as_ref(), dest.as_ref(), symlinks, &mut stats)?;
    Ok(stats)
}

fn copy_into(src: &Path, dest: &Path, symlinks: SymlinkPolicy, stats: &mut CopyStats) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::Write {
        path:   dest.to_path_buf(),
        source: e,
    })?;

    for entry in fs::read_dir(src).map_err(|e| Error::Read {
        path:   src.to_path_buf(),
        source: e,
    })? {
        let entry = entry.map_err(|e| Error::Read {
            path:   src.to_path_buf(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| Error::Read {
            path:   entry.path(),
            source: e,
        })?;

        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if file_type.is_symlink() {
            match symlinks {
                SymlinkPolicy::Skip => {
                    tracing::warn!(path = %src_path.display(), "skipping symbolic link");
                    stats.skipped += 1;
                }
                SymlinkPolicy::Error => return Err(Error::Symlink(src_path)),
            }
        } else if file_type.is_dir() {
            copy_into(&src_path, &dest_path, symlinks, stats)?;
            stats.dirs += 1;
        } else if file_type.is_file() {
            tracing::debug!(
                from = %src_path.display(),
                to = %dest_path.display(),
                "copying file"
            );
            let bytes = fs::copy(&src_path, &dest_path).map_err(|e| Error::Write {
                path:   dest_path,
                source: e,
            })?;
            stats.files += 1;
            stats.bytes += bytes;
        } else {
            tracing::warn!(path = %src_path.display(), "skipping non-regular file");
            stats.skipped += 1;
        }
    }
    Ok(())
}
