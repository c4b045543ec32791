//! Core domain logic for the shopdesk CRM and instrument-store books.
//! This crate is the single source of truth for business invariants; the
//! presentation layer only calls in and renders what comes back.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, LoggingConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{parse_entity_id, CustomerUpdate, EntityId, ValidationError};
pub use repo::crm_file::{CrmRepository, JsonFileCrmRepository};
pub use repo::store_file::{JsonFileStoreRepository, StoreRepository, StoreSnapshot};
pub use repo::{RepoError, RepoResult};
pub use service::crm_book::{CrmBook, CustomerRow};
pub use service::store_manager::{SaleLine, StoreManager};
pub use service::{EntityKind, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
