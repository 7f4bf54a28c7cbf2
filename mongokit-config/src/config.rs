//! MongoDB connection configuration.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use mongodb::options::ClientOptions;
use regex_lite::{Captures, Regex};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{MongoError, MongoResult};
use crate::uri::{build_mongo_uri, redact_uri};

/// Pool size used when none (or a non-positive one) is configured.
pub const DEFAULT_MAX_POOL_SIZE: i64 = 100;

/// Retry budget used when a negative one is configured.
pub const DEFAULT_MAX_RETRY: i32 = 3;

/// Connection timeout used when none is configured.
pub const DEFAULT_CONN_TIMEOUT: Duration = Duration::from_secs(5);

/// MongoDB connection configuration.
///
/// Either `uri` or `address` must be set. After
/// [`validate_and_set_defaults`](Self::validate_and_set_defaults) succeeds,
/// `uri` is always populated and the numeric fields are in range.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MongoConfig {
    /// Full connection URI. Built from the other fields when empty.
    pub uri: String,
    /// `host:port` entries.
    pub address: Vec<String>,
    /// Username, only used together with `password`.
    pub username: String,
    /// Password, only used together with `username`.
    pub password: String,
    /// Database name.
    pub database: String,
    /// Maximum connection pool size. Non-positive means the default.
    pub max_pool_size: i64,
    /// Retry budget for callers. Negative means the default, zero disables retries.
    pub max_retry: i32,
    /// Connection timeout. Zero means the default.
    #[serde(with = "humantime_serde")]
    pub conn_timeout: Duration,
}

impl fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "***" };
        f.debug_struct("MongoConfig")
            .field("uri", &self.redacted_uri())
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &password)
            .field("database", &self.database)
            .field("max_pool_size", &self.max_pool_size)
            .field("max_retry", &self.max_retry)
            .field("conn_timeout", &self.conn_timeout)
            .finish()
    }
}

impl MongoConfig {
    /// Create a configuration from an explicit URI.
    pub fn from_uri(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> MongoConfigBuilder {
        MongoConfigBuilder::new()
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR}` references are replaced with environment values before
    /// parsing. The result is not validated.
    pub fn from_file(path: impl AsRef<Path>) -> MongoResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MongoError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> MongoResult<Self> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// The URI with its password masked, for logs and `Debug` output.
    ///
    /// The `user:pass@` segment written by [`build_mongo_uri`] is matched
    /// exactly, since the password is not percent-encoded and may contain
    /// `?`, `/` or `@`. Any other URI goes through [`redact_uri`].
    pub fn redacted_uri(&self) -> String {
        if !self.username.is_empty() && !self.password.is_empty() {
            let credentials = format!("{}:{}@", self.username, self.password);
            if let Some((scheme, rest)) = self.uri.split_once("://") {
                if let Some(hosts) = rest.strip_prefix(&credentials) {
                    return format!("{}://{}:***@{}", scheme, self.username, hosts);
                }
            }
        }
        redact_uri(&self.uri)
    }

    /// Check required fields, fill defaults and derive the URI if needed.
    ///
    /// Fails on the first missing requirement; nothing is modified in that
    /// case. Calling this again on a validated configuration is a no-op.
    pub fn validate_and_set_defaults(&mut self) -> MongoResult<()> {
        if self.uri.is_empty() && self.address.is_empty() {
            return Err(MongoError::config("either Uri or Address must be provided"));
        }
        if self.database.is_empty() {
            return Err(MongoError::config("database is required"));
        }

        if self.max_pool_size <= 0 {
            debug!(
                configured = self.max_pool_size,
                default = DEFAULT_MAX_POOL_SIZE,
                "Using default max pool size"
            );
            self.max_pool_size = DEFAULT_MAX_POOL_SIZE;
        }
        if self.max_retry < 0 {
            debug!(
                configured = self.max_retry,
                default = DEFAULT_MAX_RETRY,
                "Using default max retry"
            );
            self.max_retry = DEFAULT_MAX_RETRY;
        }
        if self.conn_timeout.is_zero() {
            debug!(default = ?DEFAULT_CONN_TIMEOUT, "Using default connection timeout");
            self.conn_timeout = DEFAULT_CONN_TIMEOUT;
        }

        if self.uri.is_empty() {
            self.uri = build_mongo_uri(self);
            debug!(uri = %self.redacted_uri(), "Built MongoDB URI from address list");
        }

        Ok(())
    }

    /// Convert a validated configuration into driver client options.
    ///
    /// Parses the URI with the MongoDB driver, then applies the pool size and
    /// connection timeout. No connection is opened.
    pub async fn to_client_options(&self) -> MongoResult<ClientOptions> {
        if self.uri.is_empty() {
            return Err(MongoError::config(
                "uri is empty; call validate_and_set_defaults first",
            ));
        }

        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| MongoError::config(format!("failed to parse URI: {}", e)))?;

        if self.max_pool_size > 0 {
            let max_pool = u32::try_from(self.max_pool_size).map_err(|_| {
                MongoError::config(format!(
                    "max_pool_size {} exceeds the driver limit",
                    self.max_pool_size
                ))
            })?;
            options.max_pool_size = Some(max_pool);
        }

        if !self.conn_timeout.is_zero() {
            options.connect_timeout = Some(self.conn_timeout);
        }

        info!(
            uri = %self.redacted_uri(),
            database = %self.database,
            max_pool_size = self.max_pool_size,
            "MongoDB client options prepared"
        );

        Ok(options)
    }
}

/// Builder for MongoDB configuration.
#[derive(Debug, Default)]
pub struct MongoConfigBuilder {
    uri: Option<String>,
    address: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    max_pool_size: Option<i64>,
    max_retry: Option<i32>,
    conn_timeout: Option<Duration>,
}

impl MongoConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the MongoDB URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add a `host:port` entry.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address.push(address.into());
        self
    }

    /// Add several `host:port` entries.
    pub fn addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.address.extend(addresses.into_iter().map(Into::into));
        self
    }

    /// Set username and password.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: i64) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set the retry budget. Zero disables retries.
    pub fn max_retry(mut self, retries: i32) -> Self {
        self.max_retry = Some(retries);
        self
    }

    /// Set the connection timeout.
    pub fn conn_timeout(mut self, timeout: Duration) -> Self {
        self.conn_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> MongoResult<MongoConfig> {
        let mut config = MongoConfig {
            uri: self.uri.unwrap_or_default(),
            address: self.address,
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            database: self.database.unwrap_or_default(),
            max_pool_size: self.max_pool_size.unwrap_or_default(),
            max_retry: self.max_retry.unwrap_or(-1),
            conn_timeout: self.conn_timeout.unwrap_or_default(),
        };
        config.validate_and_set_defaults()?;
        Ok(config)
    }
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Replace `${VAR}` with the value of `VAR`. Unset variables are left as-is.
///
/// Expanded values are not scanned again.
fn expand_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
