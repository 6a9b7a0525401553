// Protocol constants for HNAP1

/// XML namespace every HNAP1 action lives in (trailing slash included)
pub const HNAP1_NAMESPACE: &str = "http://purenetworks.com/HNAP1/";

/// Path of the HNAP endpoint on the device
pub const HNAP1_ENDPOINT: &str = "/HNAP1/";

/// Header carrying the per-request signature and timestamp
pub const HNAP_AUTH_HEADER: &str = "HNAP_AUTH";

/// SOAPAction header name
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Timestamps are epoch milliseconds reduced modulo this value
pub const TIMESTAMP_MODULUS: u64 = 2_000_000_000_000;

/// Literal LoginResult the firmware returns on a successful login
pub const LOGIN_SUCCESS: &str = "success";
