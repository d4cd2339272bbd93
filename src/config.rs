use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Runs the bookshelf catalog service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookshelf")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

fn default_port() -> u16 {
    5003
}

fn default_database() -> String {
    "bookshelf.db".to_string()
}

fn default_sync_interval() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for App {
    fn default() -> Self {
        App { port: default_port() }
    }
}

impl App {
    pub fn get_port(&self) -> u16 {
        self.port
    }
}

/// Connection parameters for the document store.
///
/// With both `turso_url` and `turso_auth_token` set the store runs as a
/// synced replica of the remote database, otherwise as a local file.
#[derive(Debug, Deserialize, Clone)]
pub struct Store {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default)]
    pub turso_url: Option<String>,
    #[serde(default)]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            database: default_database(),
            turso_url: None,
            turso_auth_token: None,
            sync_interval_seconds: default_sync_interval(),
        }
    }
}

impl Store {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn remote(&self) -> Option<(&str, &str)> {
        match (&self.turso_url, &self.turso_auth_token) {
            (Some(url), Some(token)) => Some((url, token)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub store: Store,
}

impl Config {
    /// Loads the config at `path`, falling back to defaults when the file
    /// does not exist. `PORT` in the environment always wins over the file.
    pub fn new(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            Config::load_config(path)?
        } else {
            tracing::info!(path = ?path, "no config file found, using defaults");
            Config::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn load_config(path: &Path) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        // an empty document (or one that is only comments) means all defaults
        if yaml_with_env.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = env::var("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.app.port = port,
                Err(e) => tracing::warn!(value = %port, error = %e, "ignoring invalid PORT"),
            }
        }
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            let Some(end) = result[actual_start..].find('}') else {
                break;
            };
            let var_name = &result[actual_start + 2..actual_start + end];

            // ${VAR:-default}
            let env_value = if let Some(default_start) = var_name.find(":-") {
                let actual_var = &var_name[..default_start];
                let default_val = &var_name[default_start + 2..];
                env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
            } else {
                env::var(var_name).unwrap_or_else(|_| {
                    tracing::warn!(var = %var_name, "environment variable not found");
                    String::new()
                })
            };

            result.replace_range(actual_start..actual_start + end + 1, &env_value);
            offset = actual_start + env_value.len();
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = Config::from_yaml("# nothing here\n").unwrap();
        assert_eq!(cfg.app.get_port(), 5003);
        assert_eq!(cfg.store.get_db(), "bookshelf.db");
        assert_eq!(cfg.store.sync_interval_seconds, 60);
        assert!(cfg.store.remote().is_none());
    }

    #[test]
    fn substitutes_defaults_for_unset_vars() {
        let yaml = r#"
app:
  port: ${BOOKSHELF_TEST_UNSET_PORT:-6100}
store:
  database: ${BOOKSHELF_TEST_UNSET_DB:-catalog.db}
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_port(), 6100);
        assert_eq!(cfg.store.get_db(), "catalog.db");
    }

    #[test]
    fn remote_requires_url_and_token() {
        let yaml = r#"
store:
  turso_url: libsql://books.example.io
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert!(cfg.store.remote().is_none());

        let yaml = r#"
store:
  turso_url: libsql://books.example.io
  turso_auth_token: secret
  sync_interval_seconds: 15
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.store.remote(), Some(("libsql://books.example.io", "secret")));
        assert_eq!(cfg.store.sync_interval_seconds, 15);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("bookshelf-does-not-exist").join("config.yaml");
        let cfg = Config::new(&path).unwrap();
        assert_eq!(cfg.store.get_db(), "bookshelf.db");
    }
}
