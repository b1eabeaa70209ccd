//! Taskboard Library
//!
//! Task and project data-and-state layer: a key/value store, asynchronous
//! repositories, derived statistics and observable per-screen view state.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod logging;
pub mod repo;
pub mod stats;
pub mod store;
pub mod types;
pub mod view;

pub use context::AppContext;
pub use error::{ErrorCode, ServiceError, ServiceResult};
