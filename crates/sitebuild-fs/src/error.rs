use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("source tree not found: {0}")]
    MissingSource(PathBuf),

    #[error("source tree is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("output directory {output} overlaps source tree {tree}")]
    Overlap { output: PathBuf, tree: PathBuf },

    #[error("symbolic link encountered: {0}")]
    Symlink(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
