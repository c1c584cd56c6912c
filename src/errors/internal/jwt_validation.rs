use thiserror::Error;

/// Why a session token was rejected
///
/// Both verification paths classify the same way for the tokens this
/// system produces; callers only act on accept/reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejectionClass {
    /// No token presented
    Missing,

    /// Token is not structurally a JWT or cannot be decoded
    Malformed,

    /// Token is structurally valid but the signature does not verify
    BadSignature,

    /// Token header names an algorithm other than HS256
    UnsupportedAlgorithm,

    /// Signature verified but the token is past its expiry
    Expired,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Session token rejected: {class:?} ({note})")]
pub struct TokenRejection {
    pub class: TokenRejectionClass,

    /// Small, stable hint for logs
    pub note: &'static str,
}

impl TokenRejection {
    pub fn missing() -> Self {
        Self { class: TokenRejectionClass::Missing, note: "missing" }
    }

    pub fn malformed(note: &'static str) -> Self {
        Self { class: TokenRejectionClass::Malformed, note }
    }

    pub fn bad_signature() -> Self {
        Self { class: TokenRejectionClass::BadSignature, note: "signature" }
    }

    pub fn unsupported_algorithm() -> Self {
        Self { class: TokenRejectionClass::UnsupportedAlgorithm, note: "algorithm" }
    }

    pub fn expired() -> Self {
        Self { class: TokenRejectionClass::Expired, note: "expired" }
    }

    /// Classify a jsonwebtoken failure
    pub fn from_jwt_error(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind::*;

        match err.kind() {
            InvalidSignature => Self::bad_signature(),
            InvalidAlgorithm | InvalidAlgorithmName | MissingAlgorithm | InvalidKeyFormat => {
                Self::unsupported_algorithm()
            }
            ExpiredSignature => Self::expired(),
            InvalidToken | Base64(_) | Utf8(_) => Self::malformed("malformed"),
            Json(_) => Self::malformed("claims"),
            _ => Self::malformed("claims"),
        }
    }
}
