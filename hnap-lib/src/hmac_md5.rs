//! HMAC-MD5 implementation following RFC 2104.
//!
//! HNAP firmware expects the textbook construction: keys longer than the
//! 64-byte block are digested first, shorter keys are zero-padded, and the
//! digest runs inner-then-outer over the ipad/opad XOR masks. Keyed-hash
//! helpers in other runtimes have been observed to diverge on key
//! pre-processing, and the device rejects such signatures without any
//! diagnostic, so this module is validated against the RFC 2202 vectors.

use md5::{Digest, Md5};

const BLOCK_SIZE: usize = 64;
const DIGEST_SIZE: usize = 16;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Compute HMAC-MD5 over `message` keyed by `key`.
///
/// Returns the digest as a 32-character lowercase hex string, the form the
/// protocol transmits everywhere.
pub fn hmac_md5(key: &[u8], message: &[u8]) -> String {
    let mut key_block = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        let digest = Md5::digest(key);
        key_block[..DIGEST_SIZE].copy_from_slice(&digest);
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut ipad_key = [0u8; BLOCK_SIZE];
    let mut opad_key = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        ipad_key[i] = key_block[i] ^ IPAD;
        opad_key[i] = key_block[i] ^ OPAD;
    }

    let mut inner = Md5::new();
    inner.update(ipad_key);
    inner.update(message);
    let inner_digest = inner.finalize();

    let mut outer = Md5::new();
    outer.update(opad_key);
    outer.update(inner_digest);

    hex::encode(outer.finalize())
}
