//! Immutable data types for candidate fetching.

pub mod options;
pub mod progress;

pub use options::{FetchOptions, FetchPhase};
pub use progress::{Fetched, Progress};
