//! # configs
//!
//! Runtime settings for the streetmarket binaries.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `streetmarket.toml` in the working directory (optional)
//! 3. `.env` (loaded into the process environment, never overriding it)
//! 4. `STREETMARKET__SECTION__KEY` environment variables

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "streetmarket.toml";
pub const ENV_PREFIX: &str = "STREETMARKET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
    pub notify: NotifySettings,
    pub feed: FeedLimits,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub addr: String,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Without a URL the binary runs on the in-memory store.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub issuer: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub root: PathBuf,
    pub public_url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifySettings {
    pub webhook_url: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedLimits {
    pub trending_limit: usize,
    pub featured_limit: usize,
    pub search_limit: usize,
    pub placeholder_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Settings {
    /// Loads `.env`, then every source in precedence order.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigError::Invalid(format!(".env: {err}"))),
        }
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Defaults, then the given file if it exists, then the environment.
    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The built-in defaults as a builder other sources can be layered onto.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.issuer", "streetmarket")?
            .set_default("auth.ttl_seconds", 3600)?
            .set_default("media.root", "./data/media")?
            .set_default("media.public_url_prefix", "/media")?
            .set_default("notify.timeout_ms", 2000)?
            .set_default("feed.trending_limit", 5)?
            .set_default("feed.featured_limit", 6)?
            .set_default("feed.search_limit", 10)?
            .set_default("feed.placeholder_url", "/placeholder.svg?height=400&width=300")?
            .set_default("log.format", "json")?
            .set_default("log.filter", "info")?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".to_string()));
        }
        if self.feed.trending_limit == 0 || self.feed.featured_limit == 0 || self.feed.search_limit == 0 {
            return Err(ConfigError::Invalid("feed limits must be positive".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        let config = Settings::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(config)
    }

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let settings = from_toml("[auth]\njwt_secret = \"s3cret\"\n").unwrap();
        assert_eq!(settings.server.addr, "0.0.0.0:8080");
        assert_eq!(settings.feed.trending_limit, 5);
        assert_eq!(settings.feed.featured_limit, 6);
        assert_eq!(settings.feed.search_limit, 10);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert!(settings.database.url.is_none());
        assert!(settings.notify.webhook_url.is_none());
    }

    #[test]
    fn missing_secret_fails_to_load() {
        assert!(matches!(from_toml(""), Err(ConfigError::Load(_))));
        assert!(matches!(
            from_toml("[auth]\njwt_secret = \"  \"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            [auth]
            jwt_secret = "s3cret"
            [feed]
            search_limit = 25
            [log]
            format = "pretty"
            [database]
            url = "postgres://localhost/streetmarket"
            "#,
        )
        .unwrap();
        assert_eq!(settings.feed.search_limit, 25);
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert_eq!(
            settings.database.url.as_ref().map(|u| u.expose_secret().to_string()),
            Some("postgres://localhost/streetmarket".to_string())
        );
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let settings = from_toml("[auth]\njwt_secret = \"hunter2-hunter2\"\n").unwrap();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = from_toml("[auth]\njwt_secret = \"x\"\n[feed]\nfeatured_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
