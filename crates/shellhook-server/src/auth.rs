//! Token authorization for hook requests.
//!
//! The provided credential is the raw `Authorization` header value. Both
//! sides are hashed to fixed-size SHA-256 digests before an XOR fold, so the
//! comparison time does not depend on token length or on the position of
//! the first differing byte. Tests pin that structure (fixed-size inputs to
//! a fold over every byte) rather than measuring wall-clock time.

use sha2::{Digest, Sha256};

/// Authorization failures. Both map to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization token")]
    Missing,

    #[error("Invalid authorization token")]
    Invalid,
}

/// Checks `provided` against the token the script expects.
pub fn authorize(provided: &[u8], expected: &str) -> Result<(), AuthError> {
    if provided.is_empty() {
        return Err(AuthError::Missing);
    }
    if tokens_match(provided, expected.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::Invalid)
    }
}

const DIGEST_LEN: usize = 32;

type Digest32 = [u8; DIGEST_LEN];

fn tokens_match(provided: &[u8], expected: &[u8]) -> bool {
    constant_time_eq(&digest(provided), &digest(expected))
}

fn digest(token: &[u8]) -> Digest32 {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha256::digest(token));
    out
}

/// XOR-fold comparison over fixed-size digests; never exits early.
fn constant_time_eq(a: &Digest32, b: &Digest32) -> bool {
    mismatch_mask(a, b) == 0
}

/// OR of every byte-wise XOR. Visits all `DIGEST_LEN` pairs.
fn mismatch_mask(a: &Digest32, b: &Digest32) -> u8 {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y))
}
