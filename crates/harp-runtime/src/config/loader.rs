//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.harp/config.toml`)
//! 3. Project config (`<project>/.harp/config.toml`)
//! 4. Explicit config file (`--config PATH`)
//! 5. Environment variables (`HARP_*`)
//!
//! Each layer overrides the previous.
//!
//! File layers only override with non-default values. A later file
//! cannot switch `debug` back off or set `logging.level` back to `warn`
//! once an earlier file changed them; `HARP_DEBUG` and `HARP_LOG_LEVEL`
//! can. `capacity = 0` in a later file restores an unbounded queue.

use super::{default_config_path, ConfigError, RuntimeConfig, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($lookup:expr, $field:expr, $var:literal) => {
        if let Some(val) = $lookup($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```
/// use harp_runtime::config::{ConfigLoader, RuntimeConfig};
///
/// let config = ConfigLoader::new()
///     .skip_global_config()
///     .skip_project_config()
///     .skip_env_vars()
///     .load()
///     .unwrap();
/// assert_eq!(config, RuntimeConfig::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.harp/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    /// Explicit config file, layered after the project config.
    config_file: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.harp/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Sets an explicit config file.
    ///
    /// Unlike the global and project layers, this file must exist.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be read
    /// or parsed, if the explicit config file is missing, or if an
    /// environment variable holds an invalid value. Missing global and
    /// project files are silently ignored.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let mut config = RuntimeConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project_config);
                }
            }
        }

        if let Some(ref path) = self.config_file {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
            let explicit =
                RuntimeConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;
            debug!(path = %path.display(), "Loaded explicit config");
            config.merge(&explicit);
        }

        if !self.skip_env {
            apply_env(&mut config, |name| std::env::var(name).ok())?;
        }

        Ok(config)
    }
}

/// Loads a config file, returning None if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<RuntimeConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config = RuntimeConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(config))
}

/// Applies environment overrides read through `lookup`.
///
/// `HARP_QUEUE_CAPACITY=0` clears any configured bound.
fn apply_env<F>(config: &mut RuntimeConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_env_bool!(lookup, config.debug, "HARP_DEBUG");

    if let Some(val) = lookup("HARP_QUEUE_CAPACITY") {
        let capacity: usize = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_env_var("HARP_QUEUE_CAPACITY", "expected unsigned integer"))?;
        config.queue.capacity = (capacity > 0).then_some(capacity);
    }

    if let Some(val) = lookup("HARP_LOG_LEVEL") {
        config.logging.level = val;
    }

    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harp_types::ErrorCode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp.path(),
            r#"
debug = true

[queue]
capacity = 32
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&config_path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert!(config.debug);
        assert_eq!(config.queue.capacity, Some(32));
    }

    #[test]
    fn layers_override_in_order() {
        let global_temp = TempDir::new().unwrap();
        let project_temp = TempDir::new().unwrap();
        let explicit_temp = TempDir::new().unwrap();

        let harp_dir = project_temp.path().join(".harp");
        std::fs::create_dir_all(&harp_dir).unwrap();

        let global_path = create_config_file(
            global_temp.path(),
            r#"
debug = true

[queue]
capacity = 4

[logging]
level = "info"
"#,
        );
        create_config_file(&harp_dir, "[queue]\ncapacity = 8\n");
        let explicit = create_config_file(explicit_temp.path(), "[logging]\nlevel = \"debug\"\n");

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .with_config_file(&explicit)
            .skip_env_vars()
            .load()
            .unwrap();

        // debug from global (not overridden later)
        assert!(config.debug);
        // capacity from project
        assert_eq!(config.queue.capacity, Some(8));
        // level from explicit file
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .with_config_file("/nonexistent/harp.toml")
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_READ_FILE");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = create_config_file(temp.path(), "[queue\ncapacity = 1");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_PARSE_TOML");
    }

    #[test]
    fn env_overrides() {
        let mut config = RuntimeConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("HARP_DEBUG", "yes"),
                ("HARP_QUEUE_CAPACITY", "128"),
                ("HARP_LOG_LEVEL", "trace"),
            ]),
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.queue.capacity, Some(128));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn later_file_overrides_only_non_defaults() {
        let global_temp = TempDir::new().unwrap();
        let project_temp = TempDir::new().unwrap();
        let harp_dir = project_temp.path().join(".harp");
        std::fs::create_dir_all(&harp_dir).unwrap();

        let global_path = create_config_file(
            global_temp.path(),
            r#"
debug = true

[queue]
capacity = 8

[logging]
level = "debug"
"#,
        );
        create_config_file(
            &harp_dir,
            r#"
debug = false

[queue]
capacity = 0

[logging]
level = "warn"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .unwrap();

        // default-valued fields do not reset an earlier layer
        assert!(config.debug);
        assert_eq!(config.logging.level, "debug");
        // zero is the explicit unbounded marker
        assert_eq!(config.queue.capacity, Some(0));
    }

    #[test]
    fn env_zero_capacity_unbounds() {
        let mut config = RuntimeConfig::default();
        config.queue.capacity = Some(4);
        apply_env(&mut config, env(&[("HARP_QUEUE_CAPACITY", "0")])).unwrap();
        assert_eq!(config.queue.capacity, None);
    }

    #[test]
    fn env_invalid_values() {
        let mut config = RuntimeConfig::default();
        let err = apply_env(&mut config, env(&[("HARP_DEBUG", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("HARP_DEBUG"));

        let err = apply_env(&mut config, env(&[("HARP_QUEUE_CAPACITY", "-1")])).unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID_ENV_VAR");
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("invalid"), None);
    }
}
