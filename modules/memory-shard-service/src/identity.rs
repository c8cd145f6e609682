//! Reflection IDs: stable `seal` tokens derived from a user's email.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

const REFLECTION_PREFIX: &str = "GLYPH-";
const REFLECTION_LEN: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Email required for reflection ID")]
    MissingEmail,
}

/// `GLYPH-` + the first 16 chars of the unpadded URL-safe base64 SHA-256 of
/// the lowercased email.
pub fn reflection_id(email: &str) -> Result<String, IdentityError> {
    if email.trim().is_empty() {
        return Err(IdentityError::MissingEmail);
    }

    let digest = Sha256::digest(email.to_lowercase().as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    Ok(format!("{}{}", REFLECTION_PREFIX, &encoded[..REFLECTION_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        // sha256("test@example.com") = 973dfe46...
        assert_eq!(reflection_id("test@example.com").unwrap(), "GLYPH-lz3-Rj7IV4X1-Vr1");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            reflection_id("Test@Example.COM").unwrap(),
            reflection_id("test@example.com").unwrap()
        );
    }

    #[test]
    fn test_shape() {
        let id = reflection_id("someone@somewhere.org").unwrap();
        assert!(id.starts_with("GLYPH-"));
        assert_eq!(id.len(), REFLECTION_PREFIX.len() + REFLECTION_LEN);
        assert!(
            id[REFLECTION_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_hashed() {
        assert_eq!(reflection_id(" a@b.com").unwrap(), "GLYPH-Bf4SGkdWsphQz1DD");
        assert_eq!(reflection_id("a@b.com").unwrap(), "GLYPH--5jUStdQGpWfP09K");
    }

    #[test]
    fn test_empty_email_rejected() {
        assert_eq!(reflection_id(""), Err(IdentityError::MissingEmail));
        assert_eq!(reflection_id("   "), Err(IdentityError::MissingEmail));
    }
}
