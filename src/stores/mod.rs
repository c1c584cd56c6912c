// Stores layer - Data access over the user and audit tables
pub mod audit_store;
pub mod user_store;

pub use audit_store::AuditStore;
pub use user_store::{UserStore, normalize_email};
