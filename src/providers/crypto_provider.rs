use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw reset token entropy in bytes
const RESET_TOKEN_BYTES: usize = 32;

fn argon2_with_pepper(pepper: &str) -> Result<Argon2<'_>, InternalError> {
    Argon2::new_with_secret(
        pepper.as_bytes(),
        Algorithm::Argon2id,
        Version::V0x13,
        Params::default(),
    )
    .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
}

/// Hash a password with Argon2id using the pepper as the secret parameter
///
/// # Returns
/// PHC-formatted hash string; a fresh salt makes every call's output differ
pub fn hash_password(pepper: &str, password: &str) -> Result<String, InternalError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    let argon2 = argon2_with_pepper(pepper)?;

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::PasswordHashingFailed(e.to_string()))?
        .to_string();

    Ok(hash)
}

/// Verify a password against a stored PHC hash
///
/// A stored hash that cannot be parsed is treated as a mismatch.
pub fn verify_password(pepper: &str, password: &str, stored_hash: &str) -> Result<bool, InternalError> {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return Ok(false);
        }
    };

    let argon2 = argon2_with_pepper(pepper)?;
    Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

/// Enforce the password policy
pub fn validate_password(password: &str) -> Result<(), InternalError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CredentialError::PasswordValidationFailed(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }
    Ok(())
}

/// Compute HMAC-SHA256 of a token and return it as lowercase hex
pub fn hmac_sha256_token(key: &str, token: &str) -> Result<String, InternalError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
    mac.update(token.as_bytes());
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Generate a cryptographically secure random password
///
/// 20 characters drawn from upper and lower case letters, digits and symbols.
pub fn generate_secure_password() -> String {
    const PASSWORD_LENGTH: usize = 20;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                             abcdefghijklmnopqrstuvwxyz\
                             0123456789\
                             !@#$%^&*()_+-=[]{}|;:,.<>?";

    let mut rng = rand::rng();
    (0..PASSWORD_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Generate a raw password reset token (32 random bytes, base64url)
pub fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Credential operations bound to the process secrets
pub struct CryptoProvider {
    secret_manager: Arc<SecretManager>,
    /// Hash of a random password, verified against when no account matches
    dummy_hash: OnceLock<String>,
}

impl CryptoProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self {
            secret_manager,
            dummy_hash: OnceLock::new(),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        hash_password(self.secret_manager.password_pepper(), password)
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, InternalError> {
        verify_password(self.secret_manager.password_pepper(), password, stored_hash)
    }

    /// Run a full Argon2 verification against a hash no password matches
    ///
    /// Login calls this when there is no active account, so an unknown email
    /// costs the same as a wrong password. Always `Ok(false)`.
    pub fn verify_dummy(&self, password: &str) -> Result<bool, InternalError> {
        let dummy_hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash_password(&generate_secure_password())?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };
        self.verify_password(password, dummy_hash)
    }

    /// Hash a raw reset token for storage and lookup
    pub fn hash_reset_token(&self, raw_token: &str) -> Result<String, InternalError> {
        hmac_sha256_token(self.secret_manager.reset_token_secret(), raw_token)
    }
}

impl fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("secret_manager", &"<redacted>")
            .field("dummy_hash", &self.dummy_hash.get().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEPPER: &str = "test-pepper-for-unit-tests";

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password(PEPPER, "correct horse battery").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(PEPPER, "correct horse battery", &hash).unwrap());
        assert!(!verify_password(PEPPER, "wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hash_output_is_salted() {
        let first = hash_password(PEPPER, "same-password").unwrap();
        let second = hash_password(PEPPER, "same-password").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_with_different_pepper_fails() {
        let hash = hash_password(PEPPER, "same-password").unwrap();

        assert!(!verify_password("another-pepper-value", "same-password", &hash).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_mismatch() {
        assert!(!verify_password(PEPPER, "anything", "not-a-phc-string").unwrap());
    }

    #[test]
    fn test_validate_password_minimum_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_hmac_sha256_token_hex_format() {
        let hash = hmac_sha256_token("key", "token").unwrap();

        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hmac_sha256_token("key", "token").unwrap());
        assert_ne!(hash, hmac_sha256_token("other-key", "token").unwrap());
    }

    #[test]
    fn test_generate_secure_password() {
        let password = generate_secure_password();

        assert_eq!(password.len(), 20);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!@#$%^&*()_+-=[]{}|;:,.<>?".contains(c)));
        assert_ne!(password, generate_secure_password());
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        let provider = CryptoProvider::new(crate::test::utils::test_secret_manager());

        assert!(!provider.verify_dummy("correct horse battery").unwrap());
        let first = provider.dummy_hash.get().cloned().unwrap();
        assert!(first.starts_with("$argon2id$"));

        // Computed once, then reused
        assert!(!provider.verify_dummy("").unwrap());
        assert_eq!(provider.dummy_hash.get(), Some(&first));
    }

    #[test]
    fn test_generate_reset_token_length_and_uniqueness() {
        let token = generate_reset_token();

        assert_eq!(token.len(), 43);
        assert_eq!(URL_SAFE_NO_PAD.decode(&token).unwrap().len(), 32);
        assert_ne!(token, generate_reset_token());
    }
}
