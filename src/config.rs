//! Statement configuration.
//!
//! [`StatementConfig`] carries the backend and the fallback window sizes used
//! by [`Statement`](crate::Statement) and
//! [`Statement::paginate_default`](crate::Statement::paginate_default). It is
//! loaded from the optional `[statement]` table of `config/config.toml`,
//! overridden by `LIFEGUARD__STATEMENT__*` environment variables.

use crate::query::Backend;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatementConfig {
    #[serde(default)]
    pub backend: Backend,
    /// `LIMIT` applied to row queries that set none.
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Page size used by `Statement::paginate_default`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
}

fn default_limit() -> u64 {
    100
}

fn default_page_size() -> u64 {
    20
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            default_limit: default_limit(),
            default_page_size: default_page_size(),
        }
    }
}

impl StatementConfig {
    /// Load from `config/config.toml`, falling back to env vars.
    ///
    /// A missing `[statement]` table yields the defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError` when neither source can be read or the table is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("LIFEGUARD").separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix("LIFEGUARD").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };
        Self::from_config(&settings)
    }

    fn from_config(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<StatementConfig>("statement") {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Statement configuration could not be loaded from file or environment: {e}"
            ))),
        }
    }
}
