// src/fingerprint.rs
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the text's UTF-8 bytes.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn stable_and_sensitive() {
        let a = content_hash("Hello\nWorld");
        assert_eq!(a, content_hash("Hello\nWorld"));
        assert_ne!(a, content_hash("Hello\nPlanet"));
        assert_eq!(a.len(), 64);
    }
}
