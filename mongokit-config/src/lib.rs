//! # mongokit-config
//!
//! Connection configuration and retry advice for MongoDB clients.
//!
//! This crate provides:
//! - A [`MongoConfig`] record with validation and defaults
//! - Connection string assembly from an address list
//! - Classification of failed operations as retryable or fatal
//! - TOML settings loading with `${ENV_VAR}` interpolation
//!
//! ## Example
//!
//! ```rust
//! use mongokit_config::{MongoConfig, MongoError, should_retry};
//!
//! let mut config = MongoConfig {
//!     address: vec!["host1:27017".into(), "host2:27017".into()],
//!     database: "mydb".into(),
//!     max_pool_size: 50,
//!     ..MongoConfig::default()
//! };
//! config.validate_and_set_defaults()?;
//! assert_eq!(config.uri, "mongodb://host1:27017,host2:27017/mydb?maxPoolSize=50");
//!
//! // Later, in the caller's retry loop:
//! let err = MongoError::command(18, "AuthenticationFailed", "bad credentials");
//! assert!(!should_retry(&err));
//! # Ok::<(), MongoError>(())
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod uri;

pub use config::{
    DEFAULT_CONN_TIMEOUT, DEFAULT_MAX_POOL_SIZE, DEFAULT_MAX_RETRY, MongoConfig,
    MongoConfigBuilder,
};
pub use error::{MongoError, MongoResult};
pub use retry::{should_retry, should_retry_driver};
pub use uri::{build_mongo_uri, redact_uri};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{MongoConfig, MongoConfigBuilder};
    pub use crate::error::{MongoError, MongoResult};
    pub use crate::retry::{should_retry, should_retry_driver};
}
