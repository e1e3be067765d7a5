//! Infrastructure layer: persistence, configuration and the application
//! services that sit between HTTP handlers and storage.

pub mod config;
pub mod services;
pub mod store;

pub use config::{Config, ConfigError};
pub use services::{ServiceError, ServiceResult, Stores};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
