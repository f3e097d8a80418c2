//! Credential digest helpers. Usernames and passwords are stored only as
//! SHA-256 digests; the raw strings never reach the backing file.

use sha2::{Digest, Sha256};

/// Produces a raw SHA-256 digest of the provided bytes.
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Returns the lowercase hexadecimal representation of a SHA-256 digest.
/// Always 64 characters, byte-stable across calls and platforms.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = sha256_digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::{sha256_digest, sha256_hex};
    use hex::ToHex;

    #[test]
    fn hashes_to_hex() {
        assert_eq!(
            sha256_hex(b"alice123"),
            "4e40e8ffe0ee32fa53e139147ed559229a5930f89c2204706fc174beb36210b3"
        );
    }

    #[test]
    fn hex_form_matches_raw_digest() {
        let digest = sha256_digest(b"alice123");
        assert_eq!(digest.encode_hex::<String>(), sha256_hex(b"alice123"));
    }

    #[test]
    fn digest_is_64_lowercase_hex_chars() {
        let digest = sha256_hex(b"alice123");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(digest, sha256_hex(b"alice123"));
    }

    #[test]
    fn distinct_inputs_produce_distinct_digests() {
        assert_ne!(sha256_hex(b"alice123"), sha256_hex(b"alice124"));
    }
}
