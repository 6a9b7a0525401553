//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use hnap_lib::HnapSession;
#[allow(unused_imports)]
pub use hnap_lib::auth;
#[allow(unused_imports)]
pub use hnap_lib::error::HnapError;
#[allow(unused_imports)]
pub use hnap_lib::hmac_md5::hmac_md5;
#[allow(unused_imports)]
pub use hnap_lib::soap::{self, SoapValue};
#[allow(unused_imports)]
pub use hnap_lib::transport::{Transport, TransportError};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// One request captured by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted transport: pops one canned response per request and records
/// everything that was sent. Clones share the same script and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<Bytes>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn push_response(&self, body: &str) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back(Bytes::copy_from_slice(body.as_bytes()));
    }

    #[allow(dead_code)]
    pub fn push_raw_response(&self, body: &[u8]) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back(Bytes::copy_from_slice(body));
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(
        &self,
        url: &Url,
        body: String,
        headers: &[(String, String)],
    ) -> Result<Bytes, TransportError> {
        self.inner.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            body,
            headers: headers.to_vec(),
        });
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| "connection refused".into())
    }
}

/// Echo transport: mirrors the request parameters back under
/// `<ActionResponse>`, like a device that reflects what it was sent.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct EchoTransport;

#[async_trait]
impl Transport for EchoTransport {
    async fn post(
        &self,
        _url: &Url,
        body: String,
        _headers: &[(String, String)],
    ) -> Result<Bytes, TransportError> {
        let request = soap::parse_envelope("echo", &body).map_err(|e| e.to_string())?;
        let fields: Vec<(&str, &str)> = match &request.fields {
            SoapValue::Map(map) => map
                .iter()
                .filter_map(|(name, value)| value.as_str().map(|v| (name.as_str(), v)))
                .collect(),
            _ => Vec::new(),
        };
        let reply = soap::build_envelope(&format!("{}Response", request.root), &fields);
        Ok(Bytes::copy_from_slice(reply.as_bytes()))
    }
}

/// Transport that never answers within any reasonable deadline.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn post(
        &self,
        _url: &Url,
        _body: String,
        _headers: &[(String, String)],
    ) -> Result<Bytes, TransportError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Err("unreachable".into())
    }
}

/// Canned phase-1 login response.
#[allow(dead_code)]
pub fn login_challenge_response(challenge: &str, cookie: &str, public_key: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
<soap:Body>
<LoginResponse xmlns="http://purenetworks.com/HNAP1/">
<LoginResult>OK</LoginResult>
<Challenge>{challenge}</Challenge>
<Cookie>{cookie}</Cookie>
<PublicKey>{public_key}</PublicKey>
</LoginResponse>
</soap:Body>
</soap:Envelope>"#
    )
}

/// Canned phase-2 login response.
#[allow(dead_code)]
pub fn login_result_response(result: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
<soap:Body>
<LoginResponse xmlns="http://purenetworks.com/HNAP1/">
<LoginResult>{result}</LoginResult>
</LoginResponse>
</soap:Body>
</soap:Envelope>"#
    )
}

/// Canned single-root response with arbitrary child markup.
#[allow(dead_code)]
pub fn device_response(root: &str, children: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
<soap:Body>
<{root} xmlns="http://purenetworks.com/HNAP1/">{children}</{root}>
</soap:Body>
</soap:Envelope>"#
    )
}

/// Build a session wired to the given transport.
#[allow(dead_code)]
pub fn session_with<T: Transport + 'static>(transport: T, password: &str) -> HnapSession {
    HnapSession::new("192.168.0.1", "Admin", password)
        .expect("valid test address")
        .with_transport(Box::new(transport))
}
