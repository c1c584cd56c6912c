use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::audit::AuditRecorder;
use crate::auth::{Denied, Operation, require_operation};
use crate::config::{begin_transaction, commit_transaction};
use crate::coordinators::GatedError;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::providers::crypto_provider::{generate_reset_token, validate_password};
use crate::providers::{Clock, CryptoProvider, TokenProvider};
use crate::stores::{UserStore, normalize_email};
use crate::types::internal::audit::{AuditAction, AuditActor, AuditTarget};
use crate::types::internal::auth::{Principal, Role, TokenSubject};
use crate::types::internal::context::RequestContext;

/// Reset tokens are valid for one hour
pub const RESET_TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Session token for the `roster_session` cookie
    pub token: String,
    pub principal: Principal,
}

/// Authentication coordinator that orchestrates registration, login,
/// session and password reset workflows
pub struct AuthCoordinator {
    db: DatabaseConnection,
    user_store: UserStore,
    crypto_provider: Arc<CryptoProvider>,
    token_provider: Arc<TokenProvider>,
    audit_recorder: Arc<AuditRecorder>,
    clock: Arc<dyn Clock>,
}

impl AuthCoordinator {
    /// Create AuthCoordinator from AppData
    ///
    /// # Arguments
    /// * `app_data` - Application data containing all stores and providers
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store,
            crypto_provider: app_data.crypto_provider.clone(),
            token_provider: app_data.token_provider.clone(),
            audit_recorder: app_data.audit_recorder.clone(),
            clock: app_data.clock.clone(),
        }
    }

    /// Register a new `member` account
    ///
    /// # Returns
    /// * `Ok(Principal)` - The created account
    /// * `Err(InternalError)` - `InvalidEmail`, `PasswordValidationFailed`, `DuplicateEmail` or a store failure
    pub async fn register(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<Principal, InternalError> {
        // Step 1: Validate input
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(CredentialError::InvalidEmail(email).into());
        }
        validate_password(password)?;

        // Step 2: Hash and store
        let password_hash = self.crypto_provider.hash_password(password)?;
        let user = self
            .user_store
            .create(&self.db, &email, password_hash, Role::Member, self.clock.now_timestamp())
            .await?;

        tracing::info!(
            user_id = %user.id,
            request_id = %ctx.request_id,
            "User registered"
        );

        Ok(Principal {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    /// Orchestrate a login
    ///
    /// An unknown email, a soft-deleted account and a wrong password are
    /// indistinguishable to the caller.
    ///
    /// # Returns
    /// * `Ok(LoginOutcome)` - Session token and current principal
    /// * `Err(InternalError)` - `InvalidCredentials`, or a store/crypto failure
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, InternalError> {
        // Step 1: Look up an active account
        let user = match self.user_store.find_by_email(&self.db, email).await? {
            Some(user) if user.is_active() => user,
            Some(user) => {
                tracing::debug!(user_id = %user.id, "Login attempt on soft-deleted account");
                self.crypto_provider.verify_dummy(password)?;
                return Err(CredentialError::InvalidCredentials.into());
            }
            None => {
                tracing::debug!(ip = ?ctx.ip_address, "Login attempt for unknown email");
                self.crypto_provider.verify_dummy(password)?;
                return Err(CredentialError::InvalidCredentials.into());
            }
        };

        // Step 2: Verify password
        if !self.crypto_provider.verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, ip = ?ctx.ip_address, "Login attempt with wrong password");
            return Err(CredentialError::InvalidCredentials.into());
        }

        // Step 3: Issue the session token
        let token = self.token_provider.issue(&TokenSubject {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        })?;

        tracing::info!(user_id = %user.id, request_id = %ctx.request_id, "User logged in");

        Ok(LoginOutcome {
            token,
            principal: Principal {
                user_id: user.id,
                email: user.email,
                role: user.role,
            },
        })
    }

    /// The caller's own identity, with its current role
    pub fn me(&self, ctx: &RequestContext) -> Result<Principal, GatedError> {
        Ok(require_operation(ctx.principal.clone(), Operation::ViewOwnSession)?)
    }

    /// Record that the caller is online
    pub async fn heartbeat(&self, ctx: &RequestContext) -> Result<i64, GatedError> {
        let principal = require_operation(ctx.principal.clone(), Operation::ViewOwnSession)?;

        let now = self.clock.now_timestamp();
        if !self.user_store.touch_online(&self.db, &principal.user_id, now).await? {
            // Soft-deleted between resolution and this write
            return Err(Denied::Unauthenticated.into());
        }

        Ok(now)
    }

    /// Start a password reset
    ///
    /// # Returns
    /// * `Ok(Some(token))` - Raw token to hand to the mail collaborator
    /// * `Ok(None)` - No active account for this email
    /// * `Err(InternalError)` - Store or crypto failure
    pub async fn begin_password_reset(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<String>, InternalError> {
        let Some(user) = self.user_store.find_by_email(&self.db, email).await? else {
            return Ok(None);
        };
        if !user.is_active() {
            return Ok(None);
        }

        let raw_token = generate_reset_token();
        let token_hash = self.crypto_provider.hash_reset_token(&raw_token)?;
        let now = self.clock.now_timestamp();

        if !self
            .user_store
            .set_reset_token(&self.db, &user.id, &token_hash, now + RESET_TOKEN_TTL_SECONDS, now)
            .await?
        {
            return Ok(None);
        }

        tracing::info!(
            user_id = %user.id,
            source = ?ctx.source,
            "Password reset token issued"
        );

        Ok(Some(raw_token))
    }

    /// Finish a password reset
    ///
    /// Rejects an unknown or expired token and soft-deleted accounts with
    /// `InvalidResetToken`. The new hash, the cleared token and the
    /// `PASSWORD_RESET` record commit together.
    pub async fn complete_password_reset(
        &self,
        ctx: &RequestContext,
        email: &str,
        raw_token: &str,
        new_password: &str,
    ) -> Result<(), InternalError> {
        // Step 1: Validate the new password before touching the token
        validate_password(new_password)?;
        let token_hash = self.crypto_provider.hash_reset_token(raw_token)?;
        let password_hash = self.crypto_provider.hash_password(new_password)?;

        // Step 2: Check the token inside the transaction that consumes it
        let txn = begin_transaction(&self.db).await?;
        let Some(user) = self
            .user_store
            .find_by_email_and_reset_token(&txn, email, &token_hash)
            .await?
        else {
            return Err(CredentialError::InvalidResetToken.into());
        };

        let now = self.clock.now_timestamp();
        let unexpired = user.reset_token_expiry.is_some_and(|expiry| now < expiry);
        if !user.is_active() || !unexpired {
            return Err(CredentialError::InvalidResetToken.into());
        }

        // Step 3: Replace the password and record it
        if !self
            .user_store
            .complete_password_reset(&txn, &user.id, &token_hash, password_hash, now)
            .await?
        {
            return Err(CredentialError::InvalidResetToken.into());
        }

        let actor = AuditActor {
            id: user.id.clone(),
            role: user.role.as_str().to_string(),
        };
        let target = AuditTarget {
            id: user.id.clone(),
            email: user.email.clone(),
        };
        self.audit_recorder
            .record(&txn, AuditAction::PasswordReset, &target, &actor)
            .await?;

        commit_transaction(txn).await?;

        tracing::info!(user_id = %user.id, request_id = %ctx.request_id, "Password reset completed");

        Ok(())
    }
}

/// One `@` with a non-empty local part and a dotted domain, no whitespace
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
