use thiserror::Error;

use crate::types::internal::lifecycle::LifecycleState;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("User not found: {user_id}")]
    NotFound { user_id: String },

    /// The transition is not permitted from the account's current state
    #[error("Transition '{transition}' not allowed for user {user_id} in state {state}")]
    NotEligible {
        user_id: String,
        transition: &'static str,
        state: LifecycleState,
    },

    #[error("Actor {user_id} cannot apply '{transition}' to their own account")]
    SelfModification {
        user_id: String,
        transition: &'static str,
    },
}

impl LifecycleError {
    pub fn not_found(user_id: &str) -> Self {
        Self::NotFound { user_id: user_id.to_string() }
    }

    pub fn not_eligible(user_id: &str, transition: &'static str, state: LifecycleState) -> Self {
        Self::NotEligible {
            user_id: user_id.to_string(),
            transition,
            state,
        }
    }
}
