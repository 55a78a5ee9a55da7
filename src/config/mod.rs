use chrono::NaiveDate;
use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_PATH_ENV, find_config_file, read_config, read_config_at};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    history: History,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
}

/// Timeline settings.
#[derive(Debug, Deserialize)]
pub struct History {
    /// Chart axis used while the history log is empty.
    #[serde(default = "default_key_dates")]
    default_key_dates: Vec<NaiveDate>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            default_key_dates: default_key_dates(),
        }
    }
}

fn default_key_dates() -> Vec<NaiveDate> {
    [(2025, 9, 1), (2025, 10, 15), (2025, 12, 16), (2026, 1, 12)]
        .into_iter()
        .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    Self::from_slice(&bytes)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(ConfigError::ConfigNotFound) => {
                        tracing::error!(
                            "config not found, set {CONFIG_PATH_ENV} or create ./config.toml"
                        );
                        std::process::exit(1);
                    }
                    Err(e) => {
                        crate::error::log_error(&e);
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.app.jwt.trim().is_empty() {
            return Err(ConfigError::Invalid("app.jwt must not be empty"));
        }
        if self.history.default_key_dates.is_empty() {
            return Err(ConfigError::Invalid(
                "history.default_key_dates must not be empty",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

impl History {
    #[inline]
    pub fn default_key_dates(&self) -> &[NaiveDate] {
        &self.default_key_dates
    }
}
