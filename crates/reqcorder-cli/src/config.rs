//! Home directory discovery and `config.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

pub const HOME_ENV: &str = "REQCORDER_HOME";
pub const HOME_DIR_NAME: &str = ".reqcorder";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_LIST_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read home directory for current user")]
    NoHomeDir,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid log level `{0}`; expected one of trace, debug, info, warn, error, off")]
    InvalidLogLevel(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub list: ListConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    pub default_limit: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Where everything lives for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    pub home: PathBuf,
    pub store_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// Load `<home>/config.toml`; a missing file yields the defaults.
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(toml) => toml.parse(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn paths(&self, home: &Path) -> Paths {
        Paths {
            home: home.to_path_buf(),
            store_dir: self
                .store_dir
                .clone()
                .unwrap_or_else(|| home.join("store")),
            log_file: self
                .logging
                .file
                .clone()
                .unwrap_or_else(|| home.join("logs").join("app.log")),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// `<base>/.reqcorder`, where `base` is `env_base` when non-empty, otherwise
/// the user's home directory.
pub fn resolve_home(env_base: Option<String>) -> Result<PathBuf, ConfigError> {
    let base = match env_base.filter(|b| !b.is_empty()) {
        Some(base) => PathBuf::from(base),
        None => dirs::home_dir().ok_or(ConfigError::NoHomeDir)?,
    };
    Ok(base.join(HOME_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.list.default_limit, 10);
        assert!(config.logging.level.is_none());

        let paths = config.paths(dir.path());
        assert_eq!(paths.store_dir, dir.path().join("store"));
        assert_eq!(paths.log_file, dir.path().join("logs/app.log"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
store_dir = "/custom/store"

[logging]
level = "warn"
file = "/custom/app.log"

[list]
default_limit = 25
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        assert_eq!(config.list.default_limit, 25);
        let paths = config.paths(dir.path());
        assert_eq!(paths.store_dir, PathBuf::from("/custom/store"));
        assert_eq!(paths.log_file, PathBuf::from("/custom/app.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = "[logging]\nlevel = \"info\"\n".parse().unwrap();
        assert_eq!(config.list.default_limit, 10);
        assert!(config.store_dir.is_none());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!("store_dir = [".parse::<Config>(), Err(ConfigError::Parse(_))));
        assert!(matches!("unknown_key = 1".parse::<Config>(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn home_from_env_base() {
        let home = resolve_home(Some("/tmp/base".into())).unwrap();
        assert_eq!(home, PathBuf::from("/tmp/base/.reqcorder"));
    }

    #[test]
    fn empty_env_base_falls_back_to_user_home() {
        if let Some(user_home) = dirs::home_dir() {
            assert_eq!(resolve_home(Some(String::new())).unwrap(), user_home.join(HOME_DIR_NAME));
            assert_eq!(resolve_home(None).unwrap(), user_home.join(HOME_DIR_NAME));
        }
    }
}
