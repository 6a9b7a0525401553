pub mod auth;
pub mod constants;
pub mod error;
pub mod hmac_md5;
pub mod session;
pub mod soap;
pub mod transport;

// Re-export the session types for easy access
pub use error::HnapError;
pub use session::{HnapSession, RadioId};
