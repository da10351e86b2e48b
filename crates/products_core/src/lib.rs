//! Core of the products service.
//! A paginated soft-delete resource store over SQLite, with products as the
//! concrete resource and a message-pattern dispatcher on top.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rpc;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::page::{Page, PageMeta, PageRequest};
pub use model::product::{Product, ProductFields, ProductPatch};
pub use model::resource::{FieldError, Resource, ResourceId, ResourcePatch, Visibility};
pub use repo::product_repo::SqliteProductRepository;
pub use repo::resource_repo::{
    ActiveSlice, RepoError, RepoResult, ResourceRepository, SqlResource, SqliteResourceRepository,
};
pub use rpc::{dispatch, RpcError};
pub use service::resource_store::{ErrorKind, ResourceStore, StoreError, StoreResult};

/// Product store backed by a borrowed SQLite connection.
pub type ProductStore<'conn> = ResourceStore<Product, SqliteProductRepository<'conn>>;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
