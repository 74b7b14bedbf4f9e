//! Hashing utilities for checksums and derived identifiers.

use sha2::{Digest, Sha256};

/// Length of the short digest used for derived identifiers.
pub const SHORT_DIGEST_LEN: usize = 16;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    sha256_hex_bytes(input.as_bytes())
}

/// Computes SHA-256 hash of raw bytes and returns it as a hex string.
pub fn sha256_hex_bytes(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Returns the first [`SHORT_DIGEST_LEN`] hex characters of the SHA-256 of `input`.
///
/// Used for identifiers that only need to be unique within a process
/// (e.g. change event ids).
pub fn short_digest(input: &str) -> String {
    let mut full = sha256_hex(input);
    full.truncate(SHORT_DIGEST_LEN);
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        let hash = sha256_hex("");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_bytes_matches_str() {
        assert_eq!(sha256_hex_bytes(b"test"), sha256_hex("test"));
    }

    #[test]
    fn test_sha256_hex_different_inputs() {
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_short_digest_is_prefix() {
        let digest = short_digest("products_per_page");
        assert_eq!(digest.len(), SHORT_DIGEST_LEN);
        assert!(sha256_hex("products_per_page").starts_with(&digest));
    }
}
