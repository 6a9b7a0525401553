//! Authentication state and key derivation for the HNAP1 handshake.
//!
//! # Authentication Flow
//!
//! 1. `Login(Action=request)` returns `Challenge`, `Cookie` and `PublicKey`
//! 2. The session private key is derived from the challenge material
//! 3. `Login(Action=login)` carries the login proof derived from the
//!    private key; the device answers `LoginResult=success`
//! 4. Every later request is signed with an `HNAP_AUTH` header built from
//!    the private key and a session-unique timestamp
//!
//! All derivations are HMAC-MD5 over the hex-string forms of their inputs,
//! uppercased before transmission (the firmware normalizes to uppercase and
//! is case-sensitive in some configurations).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::TIMESTAMP_MODULUS;
use crate::hmac_md5::hmac_md5;

/// Per-session secrets and signing state.
///
/// One instance per logical connection, owned by its session. Created
/// empty, filled in by the two login sub-phases and mutated by every signed
/// request; never persisted.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Opaque session token from phase 1, sent as `Cookie: uid=<cookie>`
    pub cookie: Option<String>,
    /// Hex public key issued by the device during phase 1
    pub public_key: Option<String>,
    /// Hex challenge nonce issued by the device during phase 1
    pub challenge: Option<String>,
    /// Session private key, set once after a successful login
    pub private_key: Option<String>,
    /// Timestamp of the most recent signed request, strictly increasing
    pub last_timestamp: u64,
}

impl SessionState {
    /// Whether the phase-1 challenge material is present.
    pub fn has_challenge(&self) -> bool {
        self.challenge.is_some() && self.public_key.is_some() && self.cookie.is_some()
    }

    /// Whether the session holds a private key and can sign requests.
    pub fn is_authenticated(&self) -> bool {
        self.private_key.is_some()
    }
}

/// Derive the session private key from phase-1 challenge material.
///
/// `HMAC-MD5(key = challenge, message = public_key + password)`, uppercased.
pub fn derive_private_key(public_key: &str, password: &str, challenge: &str) -> String {
    let message = format!("{public_key}{password}");
    hmac_md5(challenge.as_bytes(), message.as_bytes()).to_uppercase()
}

/// Derive the login proof sent as `LoginPassword` in phase 2.
///
/// `HMAC-MD5(key = challenge, message = private_key)`, uppercased.
pub fn derive_login_proof(private_key: &str, challenge: &str) -> String {
    hmac_md5(challenge.as_bytes(), private_key.as_bytes()).to_uppercase()
}

/// Build the `HNAP_AUTH` header value for one outgoing request.
///
/// The returned string is `<SIGNATURE> <TIMESTAMP>` where the signature is
/// `HMAC-MD5(key = private_key, message = timestamp + soap_action)`,
/// uppercased. Commits the timestamp into `state`; call exactly once per
/// signed request, in send order.
pub fn generate_auth_header(private_key: &str, soap_action: &str, state: &mut SessionState) -> String {
    let mut timestamp = epoch_millis() % TIMESTAMP_MODULUS;
    // The device rejects repeated or rewound timestamps. Clock resolution
    // can hand out the same millisecond many times in a row, so clamp to
    // one past the last committed value.
    if timestamp <= state.last_timestamp {
        timestamp = state.last_timestamp + 1;
    }
    state.last_timestamp = timestamp;

    let message = format!("{timestamp}{soap_action}");
    let signature = hmac_md5(private_key.as_bytes(), message.as_bytes()).to_uppercase();
    format!("{signature} {timestamp}")
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
