//! Layered directory synchronization.
//!
//! An output tree is wiped and rebuilt from an ordered list of source trees.
//! Every source is mirrored into the output root with verbatim byte copies;
//! a later source overwrites files placed by an earlier one at the same
//! relative path.

mod error;
mod primitives;
mod sync;

pub use error::{Error, Result};
pub use primitives::{CopyStats, SymlinkPolicy, copy_dir_all, reset_dir};
pub use sync::{SyncOptions, SyncReport, synchronize};
