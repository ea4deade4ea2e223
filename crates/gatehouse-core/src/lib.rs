//! Gatehouse Core - shared types for the Gatehouse services
//!
//! This crate defines what the credential, profile and gateway services
//! have in common:
//! - Domain records (accounts, profiles, addresses)
//! - The error taxonomy and its HTTP mapping
//! - JSON wire types for the public and internal APIs
//! - The identity mirror contract
//! - Configuration, logging and server bootstrap
//! - Security audit logging

pub mod audit;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod logging;
pub mod mirror;
pub mod models;
pub mod server;
pub mod upstream;
pub mod wire;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, GatewayMode, LoggingConfig, ServerConfig,
    ServiceRole, ServicesConfig, StoreBackend,
};
pub use error::{ApiError, GatehouseError, Result, StoreError};
pub use extract::JsonBody;
pub use mirror::ProfileMirror;
pub use models::{Account, AccountSummary, Address, NewAddress, Profile, ProfileChanges};
