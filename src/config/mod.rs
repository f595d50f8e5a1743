pub mod types;

use crate::error::ConfigError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub use types::{Config, DynatraceConfig, WorkloadConfig};

const CONFIG_FILE_NAME: &str = ".dtk.toml";

/// Environment variable holding the environment URL
pub const URL_ENV: &str = "DYNATRACE_URL";
/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "DYNATRACE_API_TOKEN";

/// Get the global config file path (~/.dtk.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (./.dtk.toml)
pub fn local_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load configuration and apply credential overrides from `.env` and the
/// process environment.
///
/// An explicit path must exist and parse. Otherwise the local config is
/// checked first, then the global one, then defaults are used.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match config_path {
        Some(path) => read_config_file(path)?,
        None => discover_config()?,
    };

    // A missing .env is the normal case
    if let Ok(path) = dotenv::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn discover_config() -> Result<Config, ConfigError> {
    let local = local_config_path();
    if local.exists() {
        return read_config_file(&local);
    }

    if let Some(global) = global_config_path() {
        if global.exists() {
            return read_config_file(&global);
        }
    }

    Ok(Config::default())
}

/// Read and parse a TOML config file
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    debug!("Reading configuration from {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))
}

/// Override credentials with non-empty values from `lookup`
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.dynatrace.url = url;
    }
    if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
        config.dynatrace.api_token = token;
    }
    config.dynatrace.url = config.dynatrace.url.trim_end_matches('/').to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.dynatrace.url = "https://file.example.com".to_string();
        config.dynatrace.api_token = "file-token".to_string();

        let env: HashMap<&str, &str> = [(URL_ENV, "https://env.example.com/"), (TOKEN_ENV, "")]
            .into_iter()
            .collect();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.dynatrace.url, "https://env.example.com");
        // Empty variables do not clobber the file
        assert_eq!(config.dynatrace.api_token, "file-token");
    }

    #[test]
    fn test_read_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dtk.toml");
        fs::write(
            &path,
            "[dynatrace]\nurl = \"https://env.example.com\"\napi_token = \"abc\"\npage_size = 100\n",
        )
        .unwrap();

        let config = read_config_file(&path).unwrap();
        assert_eq!(config.dynatrace.page_size, 100);
        assert!(config.dynatrace.validate().is_ok());
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = read_config_file(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }

    #[test]
    fn test_read_invalid_toml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[dynatrace\nurl = ").unwrap();
        assert!(matches!(
            read_config_file(&path),
            Err(ConfigError::ParsingFailed(_))
        ));
    }
}
