use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::errors::InternalError;
use crate::errors::internal::LifecycleError;
use crate::providers::Clock;
use crate::services::LifecycleService;
use crate::stores::UserStore;
use crate::types::internal::lifecycle::{SweepFailure, SweepReport};

/// Soft-deleted accounts are kept this long before they are purged
pub const PURGE_RETENTION_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Purges accounts whose soft-delete is older than the retention window
///
/// Shared between the server's interval task and the `purge-sweep` CLI
/// command. Each candidate is purged in its own transaction; one failure
/// never stops the rest of the sweep.
pub struct PurgeSweeper {
    db: DatabaseConnection,
    user_store: UserStore,
    lifecycle: Arc<LifecycleService>,
    clock: Arc<dyn Clock>,
}

impl PurgeSweeper {
    pub fn new(
        db: DatabaseConnection,
        user_store: UserStore,
        lifecycle: Arc<LifecycleService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            user_store,
            lifecycle,
            clock,
        }
    }

    /// Run one sweep
    ///
    /// # Returns
    /// * `Ok(SweepReport)` - Per-account outcomes, failures included
    /// * `Err(InternalError)` - Only when the candidates cannot be listed
    pub async fn run(&self) -> Result<SweepReport, InternalError> {
        let cutoff = self.clock.now_timestamp() - PURGE_RETENTION_DAYS * SECONDS_PER_DAY;

        let candidates = self.user_store.find_soft_deleted_before(&self.db, cutoff).await?;

        let mut report = SweepReport {
            cutoff,
            examined: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            match self.lifecycle.auto_purge(&candidate.id, cutoff).await {
                Ok(outcome) => report.purged.push(outcome.user_id),
                // Restored or purged by someone else since the listing
                Err(InternalError::Lifecycle(
                    LifecycleError::NotEligible { .. } | LifecycleError::NotFound { .. },
                )) => {
                    tracing::debug!(user_id = %candidate.id, "Purge candidate no longer eligible");
                    report.skipped.push(candidate.id);
                }
                Err(e) => {
                    tracing::error!(user_id = %candidate.id, error = %e, "Auto-purge failed");
                    report.failures.push(SweepFailure {
                        user_id: candidate.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            cutoff,
            examined = report.examined,
            purged = report.purged.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Purge sweep finished"
        );

        Ok(report)
    }
}
