//! HTTP transport seam for the HNAP endpoint.
//!
//! The protocol core only needs `POST(url, body, headers) -> body`; keeping
//! that behind a trait lets tests drive the session with a scripted
//! transport while production code uses [`HttpTransport`] over `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// Erased transport failure, wrapped into the session error taxonomy with
/// the failing action attached.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Blocking-point collaborator: one HTTP POST per protocol operation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &Url,
        body: String,
        headers: &[(String, String)],
    ) -> Result<Bytes, TransportError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default `reqwest::Client`.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport with the provided `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &Url,
        body: String,
        headers: &[(String, String)],
    ) -> Result<Bytes, TransportError> {
        let mut request = self.client.post(url.clone()).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}
