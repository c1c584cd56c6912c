// Providers layer - Work performers
//
// Providers hold the pure, stateless building blocks: time, credential
// hashing and session token encoding/verification.

pub mod clock;
pub mod crypto_provider;
pub mod edge_token_verifier;
pub mod token_provider;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto_provider::CryptoProvider;
pub use edge_token_verifier::EdgeTokenVerifier;
pub use token_provider::{SESSION_TOKEN_TTL_SECONDS, TokenProvider};
