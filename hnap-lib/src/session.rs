//! HNAP session orchestration: login handshake and authenticated calls.

use std::time::Duration;

use strum_macros::Display;
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

use crate::auth::{self, SessionState};
use crate::constants::{
    HNAP1_ENDPOINT, HNAP1_NAMESPACE, HNAP_AUTH_HEADER, LOGIN_SUCCESS, SOAP_ACTION_HEADER,
};
use crate::error::HnapError;
use crate::soap::{self, SoapResponse};
use crate::transport::{HttpTransport, Transport};

// Default deadline for one request/response exchange with the device
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wireless radio selector for `GetWLanRadioSettings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RadioId {
    #[strum(to_string = "RADIO_2.4GHz")]
    Band24GHz,
    #[strum(to_string = "RADIO_5GHz")]
    Band5GHz,
}

/// One authenticated connection to an HNAP device.
///
/// Drives the two-phase login handshake (`Unauthenticated` →
/// `ChallengeReceived` → `Authenticated`; there is no backward transition,
/// re-authenticate on a fresh session) and signs every call issued after a
/// successful login. All operations take `&mut self`, so a session has at
/// most one outstanding request and timestamps commit in send order.
pub struct HnapSession {
    transport: Box<dyn Transport>,
    endpoint: Url,
    username: String,
    password: String,
    state: SessionState,
    timeout: Duration,
}

impl HnapSession {
    /// Create a session for the device at `address` (host or host:port).
    pub fn new(address: &str, username: &str, password: &str) -> Result<Self, HnapError> {
        let endpoint = Url::parse(&format!("http://{address}{HNAP1_ENDPOINT}"))?;
        Ok(Self {
            transport: Box::new(HttpTransport::new()),
            endpoint,
            username: username.to_string(),
            password: password.to_string(),
            state: SessionState::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replace the HTTP transport, e.g. with a scripted one in tests.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Session state, for inspection.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run both login phases in order.
    pub async fn login(&mut self) -> Result<(), HnapError> {
        self.request_challenge().await?;
        self.perform_login().await
    }

    /// Phase 1: request the login challenge (unauthenticated).
    ///
    /// Stores `Challenge`, `Cookie` and `PublicKey`; all three must come
    /// back non-empty or the handshake is unusable.
    pub async fn request_challenge(&mut self) -> Result<(), HnapError> {
        debug!("requesting login challenge");
        let username = self.username.clone();
        let response = self
            .call(
                "Login",
                &[
                    ("Action", "request"),
                    ("Username", &username),
                    ("LoginPassword", ""),
                    ("Captcha", ""),
                ],
            )
            .await?;

        let challenge = non_empty(response.fields.text_of("Challenge"));
        let cookie = non_empty(response.fields.text_of("Cookie"));
        let public_key = non_empty(response.fields.text_of("PublicKey"));
        match (challenge, cookie, public_key) {
            (Some(challenge), Some(cookie), Some(public_key)) => {
                self.state.challenge = Some(challenge.to_string());
                self.state.cookie = Some(cookie.to_string());
                self.state.public_key = Some(public_key.to_string());
                info!("login challenge received");
                Ok(())
            }
            _ => Err(HnapError::Handshake(
                "Login challenge response is missing Challenge, Cookie or PublicKey".to_string(),
            )),
        }
    }

    /// Phase 2: derive the session key and prove it to the device.
    ///
    /// The private key is committed to the session only once the device
    /// answers `success`.
    pub async fn perform_login(&mut self) -> Result<(), HnapError> {
        let (challenge, public_key) = match (
            self.state.challenge.clone(),
            self.state.public_key.clone(),
            self.state.cookie.as_deref(),
        ) {
            (Some(challenge), Some(public_key), Some(_)) => (challenge, public_key),
            _ => {
                return Err(HnapError::Handshake(
                    "Login phase 2 attempted before a challenge was received".to_string(),
                ));
            }
        };

        let private_key = auth::derive_private_key(&public_key, &self.password, &challenge);
        let proof = auth::derive_login_proof(&private_key, &challenge);
        let username = self.username.clone();
        let response = self
            .call(
                "Login",
                &[
                    ("Action", "login"),
                    ("Username", &username),
                    ("LoginPassword", &proof),
                    ("Captcha", ""),
                ],
            )
            .await?;

        let result = response.fields.text_of("LoginResult").unwrap_or_default();
        if result != LOGIN_SUCCESS {
            return Err(HnapError::Authentication {
                action: "Login".to_string(),
                result: result.to_string(),
            });
        }

        self.state.private_key = Some(private_key);
        info!("session authenticated");
        Ok(())
    }

    /// Issue one HNAP call and return the parsed response root.
    ///
    /// Attaches `HNAP_AUTH` once the session holds a private key and the
    /// session cookie once one was issued; the handshake itself goes
    /// through this same path unauthenticated.
    pub async fn call(
        &mut self,
        action: &str,
        params: &[(&str, &str)],
    ) -> Result<SoapResponse, HnapError> {
        let body = soap::build_envelope(action, params);
        // The quoted URI is both the SOAPAction header and the signed
        // material, so header and signature cannot diverge.
        let soap_action = format!("\"{HNAP1_NAMESPACE}{action}\"");

        let mut headers: Vec<(String, String)> = vec![
            (
                "Content-Type".to_string(),
                "text/xml; charset=utf-8".to_string(),
            ),
            (SOAP_ACTION_HEADER.to_string(), soap_action.clone()),
        ];
        if let Some(private_key) = self.state.private_key.clone() {
            let auth_value = auth::generate_auth_header(&private_key, &soap_action, &mut self.state);
            headers.push((HNAP_AUTH_HEADER.to_string(), auth_value));
        }
        if let Some(cookie) = &self.state.cookie {
            headers.push(("Cookie".to_string(), format!("uid={cookie}")));
        }

        debug!(action, "sending HNAP request");
        let send = self.transport.post(&self.endpoint, body, &headers);
        let raw = timeout(self.timeout, send)
            .await
            .map_err(|_| HnapError::Timeout {
                action: action.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|source| HnapError::Transport {
                action: action.to_string(),
                source,
            })?;

        let text = std::str::from_utf8(&raw)
            .map_err(|_| HnapError::protocol(action, "response body is not valid UTF-8"))?;
        let response = soap::parse_envelope(action, text)?;
        debug!(action, root = %response.root, "parsed HNAP response");
        Ok(response)
    }

    /// Query general device settings.
    pub async fn get_device_settings(&mut self) -> Result<SoapResponse, HnapError> {
        self.call("GetDeviceSettings", &[]).await
    }

    /// Query WAN configuration.
    pub async fn get_wan_settings(&mut self) -> Result<SoapResponse, HnapError> {
        self.call("GetWanSettings", &[]).await
    }

    /// Query wireless settings for one radio.
    pub async fn get_wlan_radio_settings(
        &mut self,
        radio: RadioId,
    ) -> Result<SoapResponse, HnapError> {
        let radio = radio.to_string();
        self.call("GetWLanRadioSettings", &[("RadioID", &radio)]).await
    }

    /// Query the connected-client list.
    pub async fn get_client_info(&mut self) -> Result<SoapResponse, HnapError> {
        self.call("GetClientInfo", &[]).await
    }

    /// Reboot the device.
    pub async fn reboot(&mut self) -> Result<SoapResponse, HnapError> {
        self.call("Reboot", &[]).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
