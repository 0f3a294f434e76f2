//! configuration loader (A2): YAML file with auth + download settings,
//! auto-generated on first run, mirroring the source project's
//! `yaml_configuration/config.py`
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SAMPLE_CONFIG: &str = r#"auth:
  # insert your own cookie and authorization header values here
  cookie: ''
  auth_header: ''
downloading_settings:
  target_directory: ./boosty-downloads
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub cookie: String,
    #[serde(default)]
    pub auth_header: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            auth_header: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    #[serde(default = "default_target_directory")]
    pub target_directory: PathBuf,
}

fn default_target_directory() -> PathBuf {
    PathBuf::from("./boosty-downloads")
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            target_directory: default_target_directory(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub downloading_settings: DownloadSettings,
}

impl Config {
    /// loads `path`, auto-generating a sample file and returning a
    /// `ConfigError` if it is missing (§4.12/§7); an invalid file is left
    /// untouched and also returns a `ConfigError`.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            Self::write_sample(path)?;
            return Err(AppError::ConfigError(format!(
                "no config file at {}; a sample has been written, fill in auth.cookie and auth.auth_header",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AppError::ConfigError(format!("failed to parse {}: {e}", path.display())))
    }

    fn write_sample(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, SAMPLE_CONFIG)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_writes_sample_and_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(path.exists());
    }

    #[test]
    fn valid_config_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "auth:\n  cookie: abc\n  auth_header: Bearer xyz\ndownloading_settings:\n  target_directory: /tmp/out\n",
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.auth.cookie, "abc");
        assert_eq!(cfg.downloading_settings.target_directory, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn invalid_config_does_not_overwrite_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "not: [valid yaml for our schema").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("not: [valid"));
    }
}
