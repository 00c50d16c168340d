//! Configuration with hierarchical layering.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────┐
//! │  1. Environment Variables (HARP_*)      │  Runtime override
//! ├─────────────────────────────────────────┤
//! │  2. Explicit file (--config PATH)       │  Invocation-specific
//! ├─────────────────────────────────────────┤
//! │  3. Project Config (.harp/config.toml)  │  Project-specific
//! ├─────────────────────────────────────────┤
//! │  4. Global Config (~/.harp/config.toml) │  User defaults
//! ├─────────────────────────────────────────┤
//! │  5. Default Values (compile-time)       │  Fallback
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `HARP_DEBUG` | `debug` | bool |
//! | `HARP_QUEUE_CAPACITY` | `queue.capacity` | usize (`0` = unbounded) |
//! | `HARP_LOG_LEVEL` | `logging.level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.harp/config.toml
//! debug = false
//!
//! [queue]
//! capacity = 1024
//!
//! [logging]
//! level = "harp_runtime=debug,warn"
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{LoggingConfig, QueueConfig, RuntimeConfig};

use std::path::PathBuf;

/// Project-local config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".harp";

/// Config file name inside the global and project directories.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";

/// Returns `~/.harp/config.toml`, or a relative `.harp/config.toml`
/// when no home directory is known.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
        .join(PROJECT_CONFIG_FILE)
}
