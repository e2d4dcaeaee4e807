pub mod catalog;
pub mod config;
pub mod error;
pub mod server;
pub mod web;

pub use catalog::{builtin_catalog, Catalog, CatalogSource};
pub use config::{ServerConfig, SourceKind};
pub use error::{ApiError, CatalogError};
pub use server::{router, run, AppState};
