use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of a byte slice, returning a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Shortened SHA-256 digest (first `len` hex characters).
///
/// `len` is clamped to the full 64-character digest.
pub fn short_digest(data: &[u8], len: usize) -> String {
    let mut hex = sha256_bytes(data);
    hex.truncate(len.min(64));
    hex
}
