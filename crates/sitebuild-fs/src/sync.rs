use crate::primitives::{CopyStats, SymlinkPolicy, copy_dir_all, reset_dir};
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    symlinks: SymlinkPolicy,
}

impl SyncOptions {
    pub fn new() -> Self { Self::default() }

    pub fn symlinks(mut self, symlinks: SymlinkPolicy) -> Self {
        self.symlinks = symlinks;
        self
    }

    pub fn get_symlinks(&self) -> SymlinkPolicy { self.symlinks }
}

/// Outcome of a successful [`synchronize`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub output: PathBuf,
    pub layers: Vec<CopyStats>,
}

impl SyncReport {
    pub fn total(&self) -> CopyStats {
        let mut total = CopyStats::default();
        for layer in &self.layers {
            total.merge(*layer);
        }
        total
    }
}

/// Rebuild `output` as the layered union of `sources`.
///
/// Every source is validated before the output is touched. The output is
/// then destroyed and recreated, and each source is mirrored into it in
/// order. On path collisions the later source wins.
///
/// Any filesystem error aborts the run. Nothing is rolled back, so an
/// aborted run can leave a partially built output behind.
pub fn synchronize<P: AsRef<Path>>(
    sources: &[P],
    output: impl AsRef<Path>,
    options: SyncOptions,
) -> Result<SyncReport> {
    let output = output.as_ref();

    for src in sources {
        check_source(src.as_ref(), output)?;
    }

    tracing::info!(output = %output.display(), "building static site");
    reset_dir(output)?;

    let mut report = SyncReport {
        output: output.to_path_buf(),
        layers: Vec::with_capacity(sources.len()),
    };
    for src in sources {
        let src = src.as_ref();
        tracing::info!(source = %src.display(), "copying tree");
        let stats = copy_dir_all(src, output, options.get_symlinks())?;
        tracing::debug!(
            source = %src.display(),
            files = stats.files,
            dirs = stats.dirs,
            skipped = stats.skipped,
            "tree copied"
        );
        report.layers.push(stats);
    }

    let total = report.total();
    tracing::info!(
        output = %output.display(),
        files = total.files,
        bytes = total.bytes,
        "static site ready"
    );
    Ok(report)
}

fn check_source(src: &Path, output: &Path) -> Result<()> {
    let meta = std::fs::metadata(src).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingSource(src.to_path_buf()),
        _ => Error::Read {
            path:   src.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory(src.to_path_buf()));
    }

    let tree = normalize(src)?;
    let out = normalize(output)?;
    if out.starts_with(&tree) || tree.starts_with(&out) {
        return Err(Error::Overlap {
            output: output.to_path_buf(),
            tree:   src.to_path_buf(),
        });
    }
    Ok(())
}

// Lexical: the output may not exist yet, so it cannot be canonicalized.
fn normalize(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).map_err(|e| Error::Read {
        path:   path.to_path_buf(),
        source: e,
    })?;

    let mut out = PathBuf::new();
    for comp in abs.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
