use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::errors::InternalError;
use crate::providers::TokenProvider;
use crate::stores::UserStore;
use crate::types::internal::auth::Principal;

/// Turns a raw session cookie value into a current principal
///
/// The token only proves who the caller was at issuance. Role and
/// soft-delete state always come from the user row read here.
pub struct SessionResolver {
    db: DatabaseConnection,
    user_store: UserStore,
    token_provider: Arc<TokenProvider>,
}

impl SessionResolver {
    pub fn new(db: DatabaseConnection, user_store: UserStore, token_provider: Arc<TokenProvider>) -> Self {
        Self {
            db,
            user_store,
            token_provider,
        }
    }

    /// Resolve a session
    ///
    /// # Returns
    /// * `Ok(Some(Principal))` - Valid token whose subject is an active user
    /// * `Ok(None)` - No token, invalid token, or subject missing/soft-deleted
    /// * `Err(InternalError)` - Store failure (transient, not a denial)
    pub async fn resolve(&self, raw_token: Option<&str>) -> Result<Option<Principal>, InternalError> {
        // Step 1: No token
        let Some(raw_token) = raw_token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        // Step 2: Full verification
        let claims = match self.token_provider.verify_full(raw_token) {
            Ok(claims) => claims,
            Err(rejection) => {
                tracing::debug!(class = ?rejection.class, note = rejection.note, "Session token rejected");
                return Ok(None);
            }
        };

        // Step 3: Re-read the subject
        let Some(user) = self.user_store.find_by_id(&self.db, &claims.sub).await? else {
            tracing::debug!(user_id = %claims.sub, "Session subject no longer exists");
            return Ok(None);
        };

        // Step 4: Soft-deleted accounts lose their sessions immediately
        if !user.is_active() {
            tracing::debug!(user_id = %user.id, "Session subject is soft-deleted");
            return Ok(None);
        }

        // Step 5: Current identity from the row, never from the claims
        Ok(Some(Principal {
            user_id: user.id,
            email: user.email,
            role: user.role,
        }))
    }
}
