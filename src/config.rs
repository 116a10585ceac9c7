//! Configuration for the Kwenda interpreter: loading `kwenda.toml` and defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up next to the script being run.
pub const CONFIG_FILE: &str = "kwenda.toml";

/// Environment variable holding extra module directories (platform path list).
pub const PATH_ENV: &str = "KWENDA_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Interpreter settings loaded from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KwendaConfig {
    /// Deepest allowed nesting of user function calls.
    pub max_call_depth: usize,
    /// Extra directories searched for `leta` imports.
    pub module_paths: Vec<PathBuf>,
    /// Prompt shown by `ingiza()` when no prompt is given.
    pub input_prompt: String,
}

impl Default for KwendaConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 200,
            module_paths: Vec::new(),
            input_prompt: "Ingiza thamani: ".to_string(),
        }
    }
}

impl KwendaConfig {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `kwenda.toml` from `dir`, falling back to defaults when absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text, &path)
    }

    /// Append directories listed in `KWENDA_PATH`, then the per-user module directory.
    pub fn with_env_paths(mut self) -> Self {
        if let Some(list) = env::var_os(PATH_ENV) {
            self.module_paths
                .extend(env::split_paths(&list).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Some(home) = dirs::home_dir() {
            self.module_paths.push(home.join(".kwenda").join("moduli"));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = KwendaConfig::from_toml("max_call_depth = 50", Path::new("kwenda.toml"))
            .expect("valid config");
        assert_eq!(config.max_call_depth, 50);
        assert_eq!(config.input_prompt, "Ingiza thamani: ");
        assert!(config.module_paths.is_empty());
    }

    #[test]
    fn invalid_toml_is_reported() {
        let error = KwendaConfig::from_toml("max_call_depth = \"nyingi\"", Path::new("kwenda.toml"))
            .expect_err("type mismatch");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = KwendaConfig::load_from_dir(dir.path()).expect("defaults");
        assert_eq!(config, KwendaConfig::default());
    }

    #[test]
    fn file_next_to_script_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CONFIG_FILE),
            "module_paths = [\"lib\"]\ninput_prompt = \"> \"\n",
        )
        .expect("write config");
        let config = KwendaConfig::load_from_dir(dir.path()).expect("config");
        assert_eq!(config.module_paths, vec![PathBuf::from("lib")]);
        assert_eq!(config.input_prompt, "> ");
    }
}
