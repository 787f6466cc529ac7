//! Service configuration.
//!
//! A [`Config`] is assembled by figment from three layers, each overriding the one before:
//!
//! 1. the YAML file named by `-f`/`--config` or `AQUACTL_CONFIG` (default `config.yaml`);
//! 2. `AQUACTL_*` environment variables, with `__` separating nested keys, so
//!    `AQUACTL_TRENDS__DEFAULT_DAYS=14` sets `trends.default_days`;
//! 3. a bare `DATABASE_URL`, which points the service at an external database.
//!
//! Every field has a default, so an empty file starts a service on `0.0.0.0:3001`.
//!
//! ```no_run
//! use aquactl::config::{Args, Config};
//! use clap::Parser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(&Args::parse())?;
//! println!("listening on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! Typical container overrides:
//!
//! ```bash
//! DATABASE_URL="postgresql://aquactl:secret@db/aquactl"
//! AQUACTL_AUTH__PROXY_HEADER__HEADER_NAME=x-forwarded-email
//! AQUACTL_SECURITY__CORS__ALLOWED_ORIGINS='["https://lab.example.com"]'
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::api::models::users::Role;
use crate::errors::Error;

/// Command line arguments. Everything else lives in the config file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// YAML configuration file
    #[arg(short = 'f', long, env = "AQUACTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Check the configuration and exit.
    #[arg(long)]
    pub validate: bool,
}

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Interface the HTTP listener binds to
    pub host: String,
    pub port: u16,
    /// Set from the raw `DATABASE_URL` environment variable; replaces `database` when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Where PostgreSQL runs
    pub database: DatabaseConfig,
    /// Email address of the admin user ensured on every startup
    pub admin_email: String,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
    /// Serve Prometheus metrics on `/internal/metrics`
    pub enable_metrics: bool,
    /// Export spans over OTLP (endpoint taken from `OTEL_EXPORTER_OTLP_*`)
    pub enable_otel_export: bool,
    pub trends: TrendsConfig,
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a free connection
    pub acquire_timeout_secs: u64,
    /// Seconds an idle connection is kept; 0 keeps it forever
    pub idle_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

/// PostgreSQL location, selected by `type: embedded` or `type: external`.
///
/// `embedded` needs the `embedded-db` feature and is meant for local development.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Embedded {
        /// Data directory; `.aquactl_data/postgres` when persistent and unset
        #[serde(skip_serializing_if = "Option::is_none")]
        data_dir: Option<PathBuf>,
        /// Keep data across restarts
        #[serde(default)]
        persistent: bool,
        #[serde(default)]
        pool: PoolSettings,
    },
    External {
        url: String,
        #[serde(default)]
        pool: PoolSettings,
    },
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        #[cfg(feature = "embedded-db")]
        {
            DatabaseConfig::Embedded {
                data_dir: None,
                persistent: false,
                pool: PoolSettings::default(),
            }
        }
        #[cfg(not(feature = "embedded-db"))]
        {
            DatabaseConfig::External {
                url: "postgres://localhost:5432/aquactl".to_string(),
                pool: PoolSettings::default(),
            }
        }
    }
}

impl DatabaseConfig {
    pub fn pool(&self) -> &PoolSettings {
        match self {
            DatabaseConfig::Embedded { pool, .. } | DatabaseConfig::External { pool, .. } => pool,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub proxy_header: ProxyHeaderAuthConfig,
}

/// Proxy header-based authentication configuration.
///
/// User identity is read from an HTTP header set by an upstream proxy (for example
/// oauth2-proxy or vouch). The header carries the user's email address.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyHeaderAuthConfig {
    pub enabled: bool,
    /// The name of the HTTP header containing the user's email
    pub header_name: String,
    /// Create users on first sight instead of rejecting them
    pub auto_create_users: bool,
    /// Role given to auto-created users
    pub default_role: Role,
}

impl Default for ProxyHeaderAuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header_name: "x-aquactl-user".to_string(),
            auto_create_users: true,
            default_role: Role::Operator,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    pub cors: CorsConfig,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// A configured CORS origin: `*` or an absolute URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl TryFrom<String> for CorsOrigin {
    type Error = url::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "*" => Ok(CorsOrigin::Wildcard),
            origin => Url::parse(origin).map(CorsOrigin::Url),
        }
    }
}

impl From<CorsOrigin> for String {
    fn from(origin: CorsOrigin) -> Self {
        match origin {
            CorsOrigin::Wildcard => "*".to_string(),
            CorsOrigin::Url(url) => url.into(),
        }
    }
}

/// Windows for the trends endpoint, in days.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendsConfig {
    /// Window used when the request names none
    pub default_days: i64,
    /// Larger requested windows are clamped to this
    pub max_days: i64,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            default_days: 30,
            max_days: 365,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            database: DatabaseConfig::default(),
            admin_email: "admin@aquactl.local".to_string(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            enable_metrics: true,
            enable_otel_export: false,
            trends: TrendsConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // DATABASE_URL wins over the configured database, keeping its pool settings
        if let Some(url) = config.database_url.take() {
            config.database = DatabaseConfig::External {
                url,
                pool: config.database.pool().clone(),
            };
        }

        match config.validate() {
            Ok(()) => Ok(config),
            Err(e) => Err(figment::Error::from(e.to_string())),
        }
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: String| Error::Internal {
            operation: format!("validate config: {reason}"),
        };
        let proxy = &self.auth.proxy_header;
        let cors = &self.security.cors;

        if !proxy.enabled {
            return Err(invalid(
                "auth.proxy_header.enabled is false and no other authentication exists".to_string(),
            ));
        }
        if proxy.header_name.trim().is_empty() {
            return Err(invalid("auth.proxy_header.header_name is empty".to_string()));
        }
        if cors.allowed_origins.is_empty() {
            return Err(invalid("security.cors.allowed_origins needs at least one entry".to_string()));
        }
        if cors.allow_credentials && cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
            return Err(invalid(
                "security.cors.allow_credentials cannot be combined with the wildcard origin".to_string(),
            ));
        }
        if self.trends.max_days <= 0 {
            return Err(invalid(format!("trends.max_days must be positive, got {}", self.trends.max_days)));
        }
        if !(1..=self.trends.max_days).contains(&self.trends.default_days) {
            return Err(invalid(format!(
                "trends.default_days must be between 1 and trends.max_days ({}), got {}",
                self.trends.max_days, self.trends.default_days
            )));
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // AQUACTL_CONFIG names the file itself
            .merge(Env::prefixed("AQUACTL_").ignore(&["config"]).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_from_empty_file() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "")?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 3001);
            assert_eq!(config.auth.proxy_header.header_name, "x-aquactl-user");
            assert_eq!(config.auth.proxy_header.default_role, Role::Operator);
            assert_eq!(config.trends.default_days, 30);
            assert_eq!(config.trends.max_days, 365);

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
admin_email: ops@plant.example
trends:
  default_days: 14
"#,
            )?;

            jail.set_env("AQUACTL_HOST", "127.0.0.1");
            jail.set_env("AQUACTL_PORT", "8080");
            jail.set_env("AQUACTL_TRENDS__MAX_DAYS", "90");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.trends.max_days, 90);

            // YAML values are preserved
            assert_eq!(config.admin_email, "ops@plant.example");
            assert_eq!(config.trends.default_days, 14);

            Ok(())
        });
    }

    #[test]
    fn test_database_url_overrides_database_section() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
database:
  type: external
  url: postgres://yaml-host/aquactl
  pool:
    max_connections: 3
"#,
            )?;

            jail.set_env("DATABASE_URL", "postgres://env-host/aquactl");

            let config = Config::load(&args("test.yaml"))?;

            assert!(matches!(&config.database, DatabaseConfig::External { url, .. } if url == "postgres://env-host/aquactl"));
            assert_eq!(config.database.pool().max_connections, 3);
            assert!(config.database_url.is_none());

            Ok(())
        });
    }

    #[test]
    fn test_proxy_header_and_cors_from_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
auth:
  proxy_header:
    header_name: x-forwarded-email
    auto_create_users: false
    default_role: viewer
security:
  cors:
    allowed_origins:
      - https://plant.example.com
    allow_credentials: true
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.auth.proxy_header.header_name, "x-forwarded-email");
            assert!(!config.auth.proxy_header.auto_create_users);
            assert_eq!(config.auth.proxy_header.default_role, Role::Viewer);
            assert!(matches!(
                config.security.cors.allowed_origins.as_slice(),
                [CorsOrigin::Url(url)] if url.as_str() == "https://plant.example.com/"
            ));

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "not_a_setting: true\n")?;
            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validation_wildcard_with_credentials() {
        let mut config = Config::default();
        config.security.cors.allow_credentials = true;

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("wildcard"));
    }

    #[test]
    fn test_validation_empty_origins() {
        let mut config = Config::default();
        config.security.cors.allowed_origins.clear();

        assert!(config.validate().unwrap_err().to_string().contains("allowed_origins"));
    }

    #[test]
    fn test_validation_proxy_header_disabled() {
        let mut config = Config::default();
        config.auth.proxy_header.enabled = false;

        assert!(config.validate().unwrap_err().to_string().contains("proxy_header"));
    }

    #[test]
    fn test_validation_trend_windows() {
        let mut config = Config::default();
        config.trends.default_days = 400;
        assert!(config.validate().unwrap_err().to_string().contains("default_days"));

        config.trends.default_days = 30;
        config.trends.max_days = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_days"));

        assert!(Config::default().validate().is_ok());
    }
}
