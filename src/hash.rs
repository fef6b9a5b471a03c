//! Anonymous-name content hash (spec.md §9 Open Question 1): SHA-256 of the
//! serialized graph body, truncated to 128 bits and hex-encoded to 32 ASCII
//! characters. Grounded on `ekg-phonon`'s use of `sha2` for deterministic
//! content hashing; chosen over MD5 because `sha2` is already the pack's
//! established hashing crate and nothing here depends on collision
//! resistance, only determinism.

use sha2::{Digest, Sha256};

/// Hex-encode the first 16 bytes of `sha256(body)`.
pub(crate) fn anonymous_name(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    digest[..16].iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_name_is_32_hex_characters() {
        let name = anonymous_name(b"some graph body bytes");
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn anonymous_name_is_deterministic() {
        let a = anonymous_name(b"same bytes");
        let b = anonymous_name(b"same bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn different_bodies_hash_differently() {
        let a = anonymous_name(b"graph one");
        let b = anonymous_name(b"graph two");
        assert_ne!(a, b);
    }
}
