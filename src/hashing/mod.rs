//! BLAKE3 helpers for cache keys.

use blake3::Hasher;

/// Hex-encoded BLAKE3 digest of `data`.
#[inline]
pub fn hash_to_hex(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Hashes a sequence of parts with a separator so `("ab", "c")` and `("a", "bc")` differ.
///
/// Search memo keys are built from this; a collision can only surface a stale result set
/// that expires with the search TTL.
#[inline]
pub fn hash_parts(parts: &[&[u8]]) -> String {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_hex_determinism() {
        let a = hash_to_hex(b"indemnification clause");
        let b = hash_to_hex(b"indemnification clause");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_to_hex_distinguishes_case() {
        assert_ne!(hash_to_hex(b"Contract"), hash_to_hex(b"contract"));
    }

    #[test]
    fn test_hash_parts_boundary_sensitive() {
        let left = hash_parts(&[b"ab", b"c"]);
        let right = hash_parts(&[b"a", b"bc"]);
        assert_ne!(left, right);
    }

    #[test]
    fn test_hash_parts_empty() {
        let empty = hash_parts(&[]);
        assert_eq!(empty.len(), 64);
        assert_ne!(empty, hash_parts(&[b""]));
    }
}
