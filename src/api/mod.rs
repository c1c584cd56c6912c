// API layer - HTTP endpoints
pub mod admin;
pub mod auth;
pub mod edge_guard;
pub mod health;
pub mod helpers;


pub use admin::AdminApi;
pub use auth::AuthApi;
pub use edge_guard::EdgeGuard;
pub use health::HealthApi;
