pub mod copy_dir;
pub mod reset_dir;

pub use copy_dir::{CopyStats, SymlinkPolicy, copy_dir_all};
pub use reset_dir::reset_dir;
