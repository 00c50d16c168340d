//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Runtime configuration.
///
/// Every field has a default, so any subset may appear in a file.
///
/// # Example
///
/// ```
/// use harp_runtime::config::RuntimeConfig;
///
/// let config = RuntimeConfig::from_toml("[queue]\ncapacity = 64\n").unwrap();
/// assert_eq!(config.queue.capacity, Some(64));
/// assert_eq!(config.logging.level, "warn");
/// assert!(!config.debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Enable debug logging.
    pub debug: bool,

    /// Message queue settings.
    pub queue: QueueConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Serializes to a pretty TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another layer over this one.
    ///
    /// Fields of `other` that still hold their default value do not
    /// override.
    pub fn merge(&mut self, other: &Self) {
        if other.debug {
            self.debug = true;
        }
        self.queue.merge(&other.queue);
        self.logging.merge(&other.logging);
    }
}

/// Message queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum queued messages per component. Absent or `0` means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl QueueConfig {
    fn merge(&mut self, other: &Self) {
        if other.capacity.is_some() {
            self.capacity = other.capacity;
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        if other.level != Self::default().level {
            self.level = other.level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert!(!config.debug);
        assert_eq!(config.queue.capacity, None);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = RuntimeConfig::default();
        config.queue.capacity = Some(16);
        config.logging.level = "harp=debug".into();

        let text = config.to_toml().unwrap();
        assert_eq!(RuntimeConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let mut base = RuntimeConfig::from_toml("debug = true\n[queue]\ncapacity = 8\n").unwrap();
        let overlay = RuntimeConfig::from_toml("[logging]\nlevel = \"info\"\n").unwrap();
        base.merge(&overlay);

        assert!(base.debug);
        assert_eq!(base.queue.capacity, Some(8));
        assert_eq!(base.logging.level, "info");
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(RuntimeConfig::from_toml("[queue]\ncapacity = \"many\"\n").is_err());
        assert!(RuntimeConfig::from_toml("").is_ok());
    }
}
