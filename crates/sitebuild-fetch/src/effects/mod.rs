//! I/O for candidate fetching: the HTTP seam, the staging sink and the
//! fallback loop that ties them together.

mod fetcher;
mod http;
mod staging;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient, Response};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
