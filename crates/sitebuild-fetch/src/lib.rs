//! Ordered-fallback HTTP asset downloading with staged placement.
//!
//! # Architecture
//!
//! - [`data`] - immutable options, phases and progress snapshots
//! - [`effects`] - the [`HttpClient`] seam, the staging sink and the
//!   [`Fetcher`] loop
//!
//! # Guarantees
//!
//! - **Strict order**: candidates are probed and downloaded one at a time in
//!   list order; the first full success short-circuits the rest.
//! - **No partial files**: bodies stream into a hidden sibling file that is
//!   renamed over the destination only after the last byte is written.
//! - **Mechanism only**: progress goes to a caller-supplied callback; the
//!   crate never prints.

pub mod data;
pub mod effects;
mod error;

pub use data::{FetchOptions, FetchPhase, Fetched, Progress};
pub use effects::{BoxStream, Fetcher, HttpClient, Response};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{Error, Result};
