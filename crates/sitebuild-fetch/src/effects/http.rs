use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Status line, advertised length and body of a retrieval request.
pub struct Response<E> {
    pub status:         u16,
    /// Value of the Content-Length header, if present and numeric.
    pub content_length: Option<u64>,
    pub body:           BoxStream<'static, std::result::Result<Bytes, E>>,
}

/// Asynchronous HTTP client abstraction.
///
/// The fetcher needs two requests: a cheap existence check and a streaming
/// retrieval. Implementations do not follow redirects: a 3xx answer is
/// returned as its own status, like any other code, so the caller decides
/// what counts as success. Transport failures map into the implementation's
/// error type.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - scripted clients in tests
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + 'static;

    /// Issue a HEAD request and return the status code.
    fn head(&self, url: &str) -> impl Future<Output = std::result::Result<u16, Self::Error>> + Send;

    /// Issue a GET request and hand back the unread body.
    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Response<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use super::*;
    use crate::error::{Error, Result};

    /// Production HTTP client implementation using reqwest.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> { Self::build(None) }

        /// Bound the TCP/TLS handshake of every request.
        pub fn with_connect_timeout(timeout: Duration) -> Result<Self> { Self::build(Some(timeout)) }

        fn build(connect_timeout: Option<Duration>) -> Result<Self> {
            let mut builder = reqwest::Client::builder()
                .user_agent(concat!("sitebuild/", env!("CARGO_PKG_VERSION")))
                .redirect(reqwest::redirect::Policy::none());
            if let Some(timeout) = connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            let client = builder.build().map_err(|e| Error::Network(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn head(&self, url: &str) -> std::result::Result<u16, Self::Error> {
            let response = self.client.head(url).send().await?;
            Ok(response.status().as_u16())
        }

        async fn get(&self, url: &str) -> std::result::Result<Response<Self::Error>, Self::Error> {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let content_length = response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            Ok(Response {
                status,
                content_length,
                body: Box::pin(response.bytes_stream()),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
