use sha2::{Digest, Sha256};

/// Prefix carried by every Parley API key.
pub const API_KEY_PREFIX: &str = "parley_sk_";

/// SHA-256 hex digest of a token string. Only the digest is ever stored or
/// compared; the raw token stays with the caller.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::hash_token;

    #[test]
    fn hash_is_stable_and_hex_encoded() {
        let digest = hash_token("parley_sk_test");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hash_token("parley_sk_test"));
    }

    #[test]
    fn distinct_tokens_hash_differently() {
        assert_ne!(hash_token("parley_sk_a"), hash_token("parley_sk_b"));
    }
}
