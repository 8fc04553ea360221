//! Runtime configuration: state directory, backend settings, labor rates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use sitebook_client::{ClientConfig, ClientError};
use sitebook_finance::LaborRates;

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "SITEBOOK_STATE_DIR";

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "SITEBOOK_BACKEND_URL";

/// Environment variable holding the backend bearer token.
pub const API_TOKEN_ENV: &str = "SITEBOOK_API_TOKEN";

/// Dotenv file read from the working directory and the state directory.
pub const ENV_FILE: &str = ".env.local";

/// Labor rates file, relative to the state directory.
pub const RATES_FILE: &str = "config/rates.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rates file {path}: {source}")]
    Rates {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Settings {
    pub state_dir: PathBuf,
    /// `None` means work against the local store.
    pub backend: Option<ClientConfig>,
}

impl Settings {
    /// Resolves the backend from the flag, then `SITEBOOK_BACKEND_URL`.
    ///
    /// The token comes from the flag, then `SITEBOOK_API_TOKEN`.
    pub fn resolve(
        state_dir: PathBuf,
        backend: Option<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let backend = backend
            .or_else(|| std::env::var(BACKEND_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty());

        let backend = match backend {
            Some(url) => {
                let token = token
                    .or_else(|| std::env::var(API_TOKEN_ENV).ok())
                    .unwrap_or_default();
                let config = ClientConfig::new(&url)?
                    .with_token(token)
                    .with_timeout(timeout);
                info!(url = %config.base_url, "Using backend");
                Some(config)
            }
            None => {
                debug!(state_dir = %state_dir.display(), "Using local store");
                None
            }
        };

        Ok(Self { state_dir, backend })
    }

    /// Settings for the local store only.
    pub fn local(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            backend: None,
        }
    }

    pub fn rates_path(&self) -> PathBuf {
        self.state_dir.join(RATES_FILE)
    }
}

/// Returns the state directory: the given path, else `~/.sitebook`, else
/// `./.sitebook`. (`SITEBOOK_STATE_DIR` arrives through the flag.)
pub fn state_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| {
        dirs::home_dir()
            .map(|h| h.join(".sitebook"))
            .unwrap_or_else(|| PathBuf::from(".sitebook"))
    })
}

/// Loads `.env.local` from the state directory. Variables already set win.
pub fn load_state_env(state_dir: &Path) {
    let path = state_dir.join(ENV_FILE);
    if dotenvy::from_path(&path).is_ok() {
        debug!(path = %path.display(), "Loaded environment file");
    }
}

/// Loads labor rates.
///
/// An explicitly given file must exist; the default file falls back to
/// built-in rates when missing.
pub fn load_rates(path: &Path, explicit: bool) -> Result<LaborRates, ConfigError> {
    if !explicit && !path.exists() {
        debug!(path = %path.display(), "No rates file, using defaults");
        return Ok(LaborRates::default());
    }

    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rates: LaborRates = serde_json::from_str(&data).map_err(|source| ConfigError::Rates {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rates.sanitized())
}
