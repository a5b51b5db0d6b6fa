use crate::location::PositionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub location: LocationConfig,
    pub api: ApiConfig,
    pub connectivity: ConnectivityConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Ip,
    Manual,
    None,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LocationConfig {
    pub provider: SourceKind,
    pub share_location: bool, // false behaves like a declined permission prompt
    pub manual_lat: f64,      // Used when provider = "manual"
    pub manual_lon: f64,
    pub lookup_ip: String, // Empty locates our own public address
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl LocationConfig {
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectivityConfig {
    pub probe_addr: String,
    pub probe_interval_seconds: u64,
    pub probe_timeout_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                provider: SourceKind::Ip,
                share_location: true,
                manual_lat: 40.7128,
                manual_lon: -74.0060,
                lookup_ip: String::new(),
                high_accuracy: true,
                timeout_ms: 10_000,
                maximum_age_ms: 0,
            },
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                request_timeout_seconds: 15,
            },
            connectivity: ConnectivityConfig {
                probe_addr: "1.1.1.1:443".to_string(),
                probe_interval_seconds: 5,
                probe_timeout_ms: 2_000,
            },
            ui: UiConfig { tick_rate_ms: 150 },
        }
    }
}

impl Config {
    /// Loads config.toml from the root directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        match Self::load_from(CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Config::default()
            }
        }
    }

    /// Reads `path`, writing the default configuration there first when the
    /// file is missing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: shown,
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let default_config = Config::default();
                // Save default config to disk for the user to edit later
                match toml::to_string_pretty(&default_config) {
                    Ok(toml_string) => {
                        if fs::write(path, toml_string).is_err() {
                            warn!("Could not write default {} to disk.", shown);
                        }
                    }
                    Err(e) => warn!("Could not serialize default config: {}", e),
                }
                info!("Loaded default configuration.");
                Ok(default_config)
            }
            Err(source) => Err(ConfigError::Read {
                path: shown,
                source,
            }),
        }
    }
}
