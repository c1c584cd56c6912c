use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::TokenRejection;
use crate::providers::clock::Clock;
use crate::providers::edge_token_verifier::{EdgeTokenVerifier, check_expiry};
use crate::types::internal::auth::{Claims, TokenSubject};

/// Fixed session lifetime: 7 days
pub const SESSION_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Issues and verifies session tokens
///
/// Two verification paths share one signing secret and one expiry rule:
/// `verify_full` uses the JWT library, `verify_lightweight` uses only
/// HMAC and base64 primitives.
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    clock: Arc<dyn Clock>,
    edge_verifier: EdgeTokenVerifier,
}

impl TokenProvider {
    pub fn new(secret_manager: Arc<SecretManager>, clock: Arc<dyn Clock>) -> Self {
        let edge_verifier = EdgeTokenVerifier::new(secret_manager.session_secret(), clock.clone());
        Self {
            secret_manager,
            clock,
            edge_verifier,
        }
    }

    /// Issue a signed session token
    ///
    /// # Arguments
    /// * `subject` - User id, email and role to embed
    ///
    /// # Returns
    /// * `Ok(String)` - Compact HS256 JWT valid for 7 days
    /// * `Err(InternalError)` - Crypto error if signing fails
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, InternalError> {
        let iat = self.clock.now_timestamp();
        let claims = Claims {
            sub: subject.user_id.clone(),
            email: subject.email.clone(),
            role: subject.role,
            iat,
            exp: iat + SESSION_TOKEN_TTL_SECONDS,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.session_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("session_token_issue", e.to_string()))
    }

    /// Full verification with the JWT library
    ///
    /// Only HS256 is accepted. Expiry is checked against the injected clock
    /// rather than the library's wall-clock check.
    pub fn verify_full(&self, token: &str) -> Result<Claims, TokenRejection> {
        // Sessions never embed a key
        let header = decode_header(token).map_err(|e| TokenRejection::from_jwt_error(&e))?;
        if header.jwk.is_some() {
            return Err(TokenRejection::malformed("header"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.session_secret().as_bytes()),
            &validation,
        )
        .map_err(|e| TokenRejection::from_jwt_error(&e))?;

        check_expiry(&token_data.claims, self.clock.now_timestamp())?;

        Ok(token_data.claims)
    }

    /// Lightweight verification, as run by the edge guard
    pub fn verify_lightweight(&self, token: &str) -> Result<Claims, TokenRejection> {
        self.edge_verifier.verify(token)
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("session_ttl_seconds", &SESSION_TOKEN_TTL_SECONDS)
            .finish()
    }
}

impl fmt::Display for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenProvider {{ algorithm: HS256, session_ttl: {}days }}",
            SESSION_TOKEN_TTL_SECONDS / 86_400
        )
    }
}
