// Service settings
// Loaded from an optional TOML file (VALIDASEXO_CONFIG), then overridden by environment variables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "models/modelo_genero.json";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "validasexo=info,tower_http=info";

/// Environment variable naming the optional TOML settings file.
pub const CONFIG_ENV: &str = "VALIDASEXO_CONFIG";

/// Model path variables, first match wins.
pub const MODEL_PATH_ENV: [&str; 2] = ["MODEL_GENERO", "MODEL_PATH"];
pub const BIND_ENV: &str = "VALIDASEXO_BIND";
pub const MAX_UPLOAD_ENV: &str = "VALIDASEXO_MAX_UPLOAD_BYTES";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    Io { path: PathBuf, message: String },
    /// Settings file is not valid TOML for `Settings`.
    Parse(String),
    /// A value is present but unusable.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read settings '{}': {message}", path.display())
            }
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Invalid { key, message } => write!(f, "invalid setting '{key}': {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the JSON model artifact.
    pub model_path: PathBuf,

    /// Socket address the HTTP server listens on.
    pub bind: String,

    /// Upper bound for an uploaded file, in bytes.
    pub max_upload_bytes: usize,

    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            bind: DEFAULT_BIND.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `env` as the variable lookup. Separated for tests.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = match env(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        let settings = base.with_env_overrides(env)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn with_env_overrides(mut self, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(path) = MODEL_PATH_ENV.iter().find_map(|key| env(*key)) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(bind) = env(BIND_ENV) {
            self.bind = bind;
        }
        if let Some(raw) = env(MAX_UPLOAD_ENV) {
            self.max_upload_bytes = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: MAX_UPLOAD_ENV.to_string(),
                message: format!("'{raw}' is not a byte count"),
            })?;
        }
        if let Some(filter) = env(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }
        Ok(self)
    }

    /// Check values every command needs. The bind address is only checked by
    /// `bind_addr`, after command-line overrides, since only `serve` listens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "max_upload_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "model_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|_| ConfigError::Invalid {
            key: "bind".to_string(),
            message: format!("'{}' is not a socket address", self.bind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let settings = Settings::load_with(env_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model_path, PathBuf::from("models/modelo_genero.json"));
    }

    #[test]
    fn model_genero_wins_over_model_path() {
        let settings = Settings::load_with(env_from(&[
            ("MODEL_PATH", "b.json"),
            ("MODEL_GENERO", "a.json"),
        ]))
        .unwrap();
        assert_eq!(settings.model_path, PathBuf::from("a.json"));

        let settings = Settings::load_with(env_from(&[("MODEL_PATH", "b.json")])).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("b.json"));
    }

    #[test]
    fn file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validasexo.toml");
        std::fs::write(
            &path,
            "model_path = \"/srv/modelo.json\"\nbind = \"127.0.0.1:9000\"\nmax_upload_bytes = 1024\n",
        )
        .unwrap();
        let path_str = path.to_string_lossy().to_string();

        let settings = Settings::load_with(env_from(&[
            ("VALIDASEXO_CONFIG", path_str.as_str()),
            ("VALIDASEXO_BIND", "127.0.0.1:9100"),
        ]))
        .unwrap();
        assert_eq!(settings.model_path, PathBuf::from("/srv/modelo.json"));
        assert_eq!(settings.bind, "127.0.0.1:9100");
        assert_eq!(settings.max_upload_bytes, 1024);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn bad_bind_only_fails_when_resolved() {
        let mut settings = Settings::load_with(env_from(&[("VALIDASEXO_BIND", "localhost")])).unwrap();
        let err = settings.bind_addr().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "bind"));

        settings.bind = "127.0.0.1:8080".to_string();
        assert_eq!(settings.bind_addr().unwrap(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Settings::load_with(env_from(&[("VALIDASEXO_MAX_UPLOAD_BYTES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = Settings::load_with(env_from(&[("VALIDASEXO_MAX_UPLOAD_BYTES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::load_with(env_from(&[("VALIDASEXO_CONFIG", "/nonexistent/validasexo.toml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn unknown_toml_is_parse_error() {
        assert!(matches!(Settings::from_toml("bind = 3"), Err(ConfigError::Parse(_))));
    }
}
