use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::audit::AuditRecorder;
use crate::auth::SessionResolver;
use crate::config::SecretManager;
use crate::providers::{Clock, CryptoProvider, EdgeTokenVerifier, TokenProvider};
use crate::services::{LifecycleService, PurgeSweeper};
use crate::stores::{AuditStore, UserStore};

/// Centralized application data following the main-owned stores pattern
///
/// Everything is created once in main.rs (or a CLI command) and shared
/// across coordinators and the API layer.
///
/// # Architecture
///
/// ```text
/// main.rs
///   ↓
/// AppData::new(db, secret_manager, clock, cookie_secure)
///   ↓ creates once
///   ├─ user_store / audit_store (stateless, Copy)
///   ├─ crypto_provider, token_provider, edge_verifier
///   ├─ session_resolver, audit_recorder
///   └─ lifecycle_service, purge_sweeper
///   ↓ wrapped in Arc<AppData>
///   ├─ AuthCoordinator::new(app_data)
///   └─ AdminCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub secret_manager: Arc<SecretManager>,
    pub clock: Arc<dyn Clock>,
    /// Whether session cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    pub user_store: UserStore,
    pub audit_store: AuditStore,
    pub crypto_provider: Arc<CryptoProvider>,
    pub token_provider: Arc<TokenProvider>,
    pub edge_verifier: Arc<EdgeTokenVerifier>,
    pub session_resolver: Arc<SessionResolver>,
    pub audit_recorder: Arc<AuditRecorder>,
    pub lifecycle_service: Arc<LifecycleService>,
    pub purge_sweeper: Arc<PurgeSweeper>,
}

impl AppData {
    /// Build all application data
    ///
    /// The database must already be migrated.
    pub fn new(
        db: DatabaseConnection,
        secret_manager: Arc<SecretManager>,
        clock: Arc<dyn Clock>,
        cookie_secure: bool,
    ) -> Self {
        tracing::debug!("Initializing AppData...");

        let user_store = UserStore::new();
        let audit_store = AuditStore::new();

        let crypto_provider = Arc::new(CryptoProvider::new(secret_manager.clone()));
        let token_provider = Arc::new(TokenProvider::new(secret_manager.clone(), clock.clone()));
        let edge_verifier = Arc::new(EdgeTokenVerifier::new(
            secret_manager.session_secret(),
            clock.clone(),
        ));

        let session_resolver = Arc::new(SessionResolver::new(
            db.clone(),
            user_store,
            token_provider.clone(),
        ));
        let audit_recorder = Arc::new(AuditRecorder::new(db.clone(), audit_store, clock.clone()));

        let lifecycle_service = Arc::new(LifecycleService::new(
            db.clone(),
            user_store,
            audit_store,
            audit_recorder.clone(),
            clock.clone(),
        ));
        let purge_sweeper = Arc::new(PurgeSweeper::new(
            db.clone(),
            user_store,
            lifecycle_service.clone(),
            clock.clone(),
        ));

        tracing::debug!("AppData initialized");

        Self {
            db,
            secret_manager,
            clock,
            cookie_secure,
            user_store,
            audit_store,
            crypto_provider,
            token_provider,
            edge_verifier,
            session_resolver,
            audit_recorder,
            lifecycle_service,
            purge_sweeper,
        }
    }
}
