use std::fmt;

/// Lifecycle state of a user account
///
/// Purged has no row to carry it, so it only appears in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    SoftDeleted,
    Purged,
}

impl LifecycleState {
    pub fn from_deleted_at(deleted_at: Option<i64>) -> Self {
        match deleted_at {
            Some(_) => Self::SoftDeleted,
            None => Self::Active,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::SoftDeleted => f.write_str("soft_deleted"),
            Self::Purged => f.write_str("purged"),
        }
    }
}

/// What a purge removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub user_id: String,
    pub email: String,
    /// Audit records that targeted the purged account
    pub audit_records_deleted: u64,
}

/// Outcome of one purge sweep
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Accounts soft-deleted at or before this Unix timestamp were eligible
    pub cutoff: i64,
    /// Number of candidate accounts found
    pub examined: usize,
    /// Ids of accounts purged in this run
    pub purged: Vec<String>,
    /// Candidates that stopped being eligible before their purge ran
    pub skipped: Vec<String>,
    /// Per-account failures; these never abort the sweep
    pub failures: Vec<SweepFailure>,
}

#[derive(Debug, Clone)]
pub struct SweepFailure {
    pub user_id: String,
    pub reason: String,
}
