use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::errors::internal::TokenRejection;
use crate::providers::clock::Clock;
use crate::types::internal::auth::Claims;

type HmacSha256 = Hmac<Sha256>;

/// The only signing algorithm sessions use
pub const SESSION_TOKEN_ALGORITHM: &str = "HS256";

/// JOSE header, typed field by field like jsonwebtoken's `Header`
///
/// A registered field with the wrong JSON type fails to decode here exactly
/// as it does in the full verifier. Unknown fields are ignored by both.
#[derive(Deserialize)]
#[allow(dead_code)]
struct TokenHeader {
    alg: String,
    typ: Option<String>,
    cty: Option<String>,
    jku: Option<String>,
    jwk: Option<serde_json::Value>,
    kid: Option<String>,
    x5u: Option<String>,
    x5c: Option<Vec<String>>,
    x5t: Option<String>,
    #[serde(rename = "x5t#S256")]
    x5t_s256: Option<String>,
}

/// Expiry rule shared by both verification paths: valid while `now < exp`
pub(crate) fn check_expiry(claims: &Claims, now: i64) -> Result<(), TokenRejection> {
    if now >= claims.exp {
        return Err(TokenRejection::expired());
    }
    Ok(())
}

fn decode_segment(segment: &str, note: &'static str) -> Result<Vec<u8>, TokenRejection> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenRejection::malformed(note))
}

/// Lightweight session token verifier
///
/// Uses only HMAC-SHA256, base64url and JSON so it can run where the full
/// JWT library is unavailable (an edge guard in front of admin routes).
/// Accepts exactly the tokens `TokenProvider::verify_full` accepts.
pub struct EdgeTokenVerifier {
    key: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl EdgeTokenVerifier {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            clock,
        }
    }

    /// Verify a compact HS256 token and return its claims
    ///
    /// # Arguments
    /// * `token` - `header.payload.signature`, each base64url without padding
    ///
    /// # Returns
    /// * `Ok(Claims)` - Signature valid and token unexpired
    /// * `Err(TokenRejection)` - Classified rejection
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenRejection::malformed("segments"));
        };

        // Step 1: Header must decode and name HS256
        let header_bytes = decode_segment(header_b64, "header")?;
        let header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|_| TokenRejection::malformed("header"))?;
        if header.alg != SESSION_TOKEN_ALGORITHM {
            return Err(TokenRejection::unsupported_algorithm());
        }
        // Sessions never embed a key
        if header.jwk.is_some() {
            return Err(TokenRejection::malformed("header"));
        }

        // Step 2: Constant-time signature check over "header.payload"
        let signature = decode_segment(signature_b64, "signature")?;
        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| TokenRejection::bad_signature())?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenRejection::bad_signature())?;

        // Step 3: Claims and expiry
        let payload = decode_segment(payload_b64, "payload")?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| TokenRejection::malformed("claims"))?;
        check_expiry(&claims, self.clock.now_timestamp())?;

        Ok(claims)
    }
}

impl fmt::Debug for EdgeTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeTokenVerifier")
            .field("key", &"<redacted>")
            .finish()
    }
}
