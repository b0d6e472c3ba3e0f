//! Settings of the extension.
//!
//! They live in `<REAPER resource path>/Scythe/scythe.json`. A file with default values is written
//! on first start so users have something to edit. Environment variables win over the file.
use camino::{Utf8Path, Utf8PathBuf};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

pub const CONFIG_DIR_NAME: &str = "Scythe";
pub const CONFIG_FILE_NAME: &str = "scythe.json";

pub const HOST_VAR: &str = "SCYTHE_HOST";
pub const PORT_VAR: &str = "SCYTHE_PORT";
pub const LOG_VAR: &str = "SCYTHE_LOG";

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScytheConfig {
    /// Whether to start the server when REAPER starts.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// How long a tool call may wait for REAPER's main thread.
    pub call_timeout_ms: u64,
    /// Filter directives as understood by `tracing_subscriber::EnvFilter`.
    pub log_level: String,
}

impl Default for ScytheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 9500,
            call_timeout_ms: 30_000,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display(fmt = "Couldn't access config file {}: {}", path, source)]
    Io { path: Utf8PathBuf, source: io::Error },
    #[display(fmt = "Config file {} is invalid: {}", path, source)]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[display(fmt = "{} must be a port number but is '{}'", name, value)]
    InvalidPort { name: &'static str, value: String },
    #[display(fmt = "REAPER resource path is not valid UTF-8")]
    NonUtf8ResourcePath,
}

impl ScytheConfig {
    pub fn file_path(resource_dir: &Utf8Path) -> Utf8PathBuf {
        resource_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    /// Reads the config file, creating it with default values if it doesn't exist yet.
    pub fn load_or_create(path: &Utf8Path) -> Result<ScytheConfig, ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_owned(),
            source,
        };
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = ScytheConfig::default();
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir).map_err(io_error)?;
                }
                let text = serde_json::to_string_pretty(&config).map_err(|source| {
                    ConfigError::Parse {
                        path: path.to_owned(),
                        source,
                    }
                })?;
                fs::write(path, text).map_err(io_error)?;
                tracing::info!(msg = "Created default config file", %path);
                Ok(config)
            }
            Err(e) => Err(io_error(e)),
        }
    }

    /// Applies `SCYTHE_HOST`, `SCYTHE_PORT` and `SCYTHE_LOG`. Empty values are ignored.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(host) = var(HOST_VAR) {
            self.host = host;
        }
        if let Some(port) = var(PORT_VAR) {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort {
                name: PORT_VAR,
                value: port.clone(),
            })?;
        }
        if let Some(level) = var(LOG_VAR) {
            self.log_level = level;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_config_path(dir: &tempfile::TempDir) -> Utf8PathBuf {
        let dir = Utf8Path::from_path(dir.path()).unwrap();
        ScytheConfig::file_path(dir)
    }

    #[test]
    fn creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_config_path(&dir);
        let config = ScytheConfig::load_or_create(&path).unwrap();
        assert_eq!(config, ScytheConfig::default());
        assert!(path.as_str().ends_with("Scythe/scythe.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["port"], serde_json::json!(9500));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_config_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"port": 9600, "enabled": false}"#).unwrap();
        let config = ScytheConfig::load_or_create(&path).unwrap();
        assert_eq!(config.port, 9600);
        assert!(!config.enabled);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_config_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{port: ").unwrap();
        assert!(matches!(
            ScytheConfig::load_or_create(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn environment_wins() {
        let env: HashMap<&str, &str> = [
            ("SCYTHE_HOST", "0.0.0.0"),
            ("SCYTHE_PORT", " 9700 "),
            ("SCYTHE_LOG", ""),
        ]
        .into_iter()
        .collect();
        let mut config = ScytheConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9700);
        assert_eq!(config.log_level, "info");
        let error = config
            .apply_env(|name| (name == PORT_VAR).then(|| "http".to_string()))
            .unwrap_err();
        assert_eq!(error.to_string(), "SCYTHE_PORT must be a port number but is 'http'");
    }
}
