// Coordinators layer - Workflow orchestration
//
// Coordinators compose gate, store, provider and service calls for
// specific API endpoints and CLI commands. Authorization happens here,
// against the principal the API layer resolved into the RequestContext.

pub mod admin_coordinator;
pub mod auth_coordinator;

pub use admin_coordinator::AdminCoordinator;
pub use auth_coordinator::{AuthCoordinator, LoginOutcome};

use crate::auth::Denied;
use crate::errors::InternalError;
use crate::errors::api::{AdminError, AuthError};

/// Outcome of a gated workflow that did not succeed
///
/// Keeps a gate denial apart from a failure so the API layer can tell
/// 401/403 from 4xx domain errors and 5xx.
#[derive(Debug)]
pub enum GatedError {
    Denied(Denied),
    Internal(InternalError),
}

impl From<Denied> for GatedError {
    fn from(denied: Denied) -> Self {
        GatedError::Denied(denied)
    }
}

impl From<InternalError> for GatedError {
    fn from(err: InternalError) -> Self {
        GatedError::Internal(err)
    }
}

impl From<GatedError> for AdminError {
    fn from(err: GatedError) -> Self {
        match err {
            GatedError::Denied(denied) => AdminError::from_denied(denied),
            GatedError::Internal(err) => AdminError::from_internal_error(err),
        }
    }
}

impl From<GatedError> for AuthError {
    fn from(err: GatedError) -> Self {
        match err {
            GatedError::Denied(denied) => AuthError::from_denied(denied),
            GatedError::Internal(err) => AuthError::from_internal_error(err),
        }
    }
}
