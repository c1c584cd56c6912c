// Database entities - SeaORM models
pub mod audit_record;
pub mod user;
