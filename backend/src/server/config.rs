//! Runtime settings and the HTTP server configuration object.
//!
//! [`AppSettings`] is loaded through OrthoConfig from `YAMDB_*` environment
//! variables, configuration files and the command line. Accessors apply the
//! defaults and validate values so `main` only deals with typed settings.

use std::net::SocketAddr;

use chrono::Duration;
use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;
use yamdb::domain::{AuthSettings, Email, Username};
use yamdb::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address does not parse as `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    /// A lifetime was zero or negative.
    #[error("{name} must be a positive number of minutes")]
    NonPositiveTtl { name: &'static str },
    /// The page size is outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    PageSize(u32),
    /// The connection pool limit was zero.
    #[error("database pool needs at least one connection")]
    PoolSize,
    /// Only one of the bootstrap admin fields was given.
    #[error("bootstrap admin needs both a username and an email")]
    IncompleteBootstrap,
    /// A bootstrap admin field failed validation.
    #[error("invalid bootstrap admin {field}: {message}")]
    BootstrapAdmin {
        field: &'static str,
        message: String,
    },
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "YAMDB")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Bearer token lifetime.
    pub token_ttl_minutes: Option<i64>,
    /// Confirmation code lifetime.
    pub confirmation_code_ttl_minutes: Option<i64>,
    /// Default page size for list endpoints.
    pub page_size: Option<u32>,
    /// Sender address for confirmation mail.
    pub mail_from: Option<String>,
    /// Username ensured to exist with the admin role at startup.
    pub bootstrap_admin_username: Option<String>,
    /// Email for a newly created bootstrap admin.
    pub bootstrap_admin_email: Option<String>,
}

fn ttl(
    name: &'static str,
    minutes: Option<i64>,
    default: Duration,
) -> Result<Duration, SettingsError> {
    match minutes {
        None => Ok(default),
        Some(minutes) if minutes > 0 => Ok(Duration::minutes(minutes)),
        Some(_) => Err(SettingsError::NonPositiveTtl { name }),
    }
}

impl AppSettings {
    /// Listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Database URL when one is configured and non-empty.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool settings for `url`, honouring `db_max_connections`.
    pub fn pool_config(&self, url: &str) -> Result<PoolConfig, SettingsError> {
        let config = PoolConfig::new(url);
        match self.db_max_connections {
            None => Ok(config),
            Some(0) => Err(SettingsError::PoolSize),
            Some(size) => Ok(config
                .with_max_size(size)
                .with_min_idle(Some(size.min(2)))),
        }
    }

    /// Token and code lifetimes plus the mail sender.
    pub fn auth_settings(&self) -> Result<AuthSettings, SettingsError> {
        let defaults = AuthSettings::default();
        Ok(AuthSettings {
            token_ttl: ttl("token_ttl_minutes", self.token_ttl_minutes, defaults.token_ttl)?,
            code_ttl: ttl(
                "confirmation_code_ttl_minutes",
                self.confirmation_code_ttl_minutes,
                defaults.code_ttl,
            )?,
            mail_from: self.mail_from.clone().unwrap_or(defaults.mail_from),
        })
    }

    /// Default page size, falling back to [`DEFAULT_PAGE_SIZE`].
    pub fn page_size(&self) -> Result<u32, SettingsError> {
        match self.page_size {
            None => Ok(DEFAULT_PAGE_SIZE),
            Some(size) if (1..=MAX_PAGE_SIZE).contains(&size) => Ok(size),
            Some(size) => Err(SettingsError::PageSize(size)),
        }
    }

    /// Validated bootstrap admin identity, if configured.
    pub fn bootstrap_admin(&self) -> Result<Option<(Username, Email)>, SettingsError> {
        match (&self.bootstrap_admin_username, &self.bootstrap_admin_email) {
            (None, None) => Ok(None),
            (Some(username), Some(email)) => {
                let username = Username::new(username.as_str()).map_err(|err| {
                    SettingsError::BootstrapAdmin {
                        field: "username",
                        message: err.to_string(),
                    }
                })?;
                let email = Email::new(email).map_err(|err| SettingsError::BootstrapAdmin {
                    field: "email",
                    message: err.to_string(),
                })?;
                Ok(Some((username, email)))
            }
            _ => Err(SettingsError::IncompleteBootstrap),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) auth: AuthSettings,
    pub(crate) page_size: u32,
}

impl ServerConfig {
    /// Configuration with default auth settings and page size, backed by
    /// the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            auth: AuthSettings::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Attach a database connection pool; repositories become Diesel-backed.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override token and code lifetimes.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }

    /// Override the default page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}
