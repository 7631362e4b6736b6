use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::GbifError;

pub const CONFIG_FILE: &str = "gbif-fetch.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub output_dir: Utf8PathBuf,
    pub http: HttpSettings,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub archive: Utf8PathBuf,
    pub output_root: Utf8PathBuf,
    pub http: HttpSettings,
    pub assume_yes: bool,
}

impl RunConfig {
    pub fn new(archive: Utf8PathBuf, resolved: ResolvedConfig) -> Self {
        Self {
            archive,
            output_root: resolved.output_dir,
            http: resolved.http,
            assume_yes: false,
        }
    }

    pub fn set_timeout(&mut self, timeout_secs: u64) -> Result<(), GbifError> {
        if timeout_secs == 0 {
            return Err(GbifError::ConfigParse(
                "--timeout must be greater than zero".to_string(),
            ));
        }
        self.http.timeout_secs = timeout_secs;
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    // An explicit path must exist; discovery falls back to defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GbifError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let config = match config_path {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| GbifError::ConfigRead(config_path.clone()))?;
                serde_json::from_str(&content)
                    .map_err(|err| GbifError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GbifError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(GbifError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }
        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(GbifError::ConfigParse(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version,
            output_dir: config.output_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            http: HttpSettings {
                timeout_secs,
                user_agent: config.user_agent.unwrap_or_else(default_user_agent),
            },
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        ProjectDirs::from("", "", "gbif-fetch")
            .map(|dirs| dirs.config_dir().join("config.json"))
            .filter(|path| path.is_file())
    }
}

pub fn default_user_agent() -> String {
    format!("gbif-fetch/{}", env!("CARGO_PKG_VERSION"))
}
