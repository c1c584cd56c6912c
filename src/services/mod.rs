// Services layer - Account state transitions and the sweeps built on them
pub mod lifecycle_service;
pub mod purge_sweeper;

pub use lifecycle_service::LifecycleService;
pub use purge_sweeper::{PURGE_RETENTION_DAYS, PurgeSweeper};
