use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Remove `path` recursively if it exists, then recreate it empty.
///
/// A missing directory is not an error.
pub fn reset_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    match fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed previous output"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::Remove {
                path:   path.to_path_buf(),
                source: e,
            });
        }
    }

    fs::create_dir_all(path).map_err(|e| Error::Write {
        path:   path.to_path_buf(),
        source: e,
    })
}
