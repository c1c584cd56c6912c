// Internal types - shared across providers, stores, services and coordinators
pub mod audit;
pub mod auth;
pub mod context;
pub mod lifecycle;
