//! Configuration Management
//!
//! Provides functionality for:
//! - Loading flat dotted-key settings from YAML
//! - Command-line overrides
//! - Typed, validated lookups
//! - Role resolution (see [`roles`])

pub mod roles;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{DiscoveryError, Result};
use crate::utils::parse_bool_or;

pub use roles::{NodeMode, RoleConfig};

/// Raw process configuration as `node.master = "false"` style entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a YAML file; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Configuration file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| DiscoveryError::config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml_str(&contents)
    }

    /// Parses YAML, flattening nested maps into dotted keys and sequences into
    /// `key.0`, `key.1`, ...
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(contents)
            .map_err(|e| DiscoveryError::config(format!("Failed to parse config file: {}", e)))?;
        let mut settings = Self::default();
        flatten("", &value, &mut settings.entries)?;
        Ok(settings)
    }

    /// Get configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nexa")
            .join("node.yml")
    }

    pub fn put(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Entries from `other` win over existing ones.
    pub fn merge(mut self, other: Settings) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Strict boolean lookup, see [`parse_bool_exact`](crate::utils::parse_bool_exact).
    pub fn get_as_bool(&self, key: &str, default: bool) -> Result<bool> {
        parse_bool_or(key, self.get(key), default)
    }

    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| DiscoveryError::config(format!("Failed to parse value [{}] for [{}]", raw, key)))
            })
            .transpose()
    }

    /// Entries under `prefix`, with the prefix stripped.
    pub fn by_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) -> Result<()> {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), item, out)?;
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(DiscoveryError::config(format!(
                            "Unsupported configuration key {:?}",
                            other
                        )))
                    }
                };
                flatten(&join(&key), item, out)?;
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out)?,
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for JSON log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Number of log files to keep
    #[serde(default = "default_log_files")]
    pub files_to_keep: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            files_to_keep: default_log_files(),
        }
    }
}

impl LoggingConfig {
    /// Deserializes the `logging.*` section of `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut section = Mapping::new();
        for (key, raw) in settings.by_prefix("logging.") {
            let value = serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            section.insert(Value::String(key.to_string()), value);
        }
        serde_yaml::from_value(Value::Mapping(section))
            .map_err(|e| DiscoveryError::config(format!("Invalid logging configuration: {}", e)))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_files() -> usize {
    7
}
