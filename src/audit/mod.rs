pub mod audit_recorder;

pub use audit_recorder::{AuditRecorder, DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT, clamp_limit};
