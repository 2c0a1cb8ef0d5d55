//! # Configuration System
//!
//! Hierarchical TOML configuration for the treeland-stress tools.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.treeland-stress/config.toml`
//! 3. **Project config** - `./.treeland-stress/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.treeland-stress/config.toml
//! [apps]
//! interval_secs = 0.5
//! max_processes = 4
//! compositor = "treeland"
//!
//! [display]
//! interval_secs = 2.0
//! tool = "wlr-randr"
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use treeland_stress_core::config::StressConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StressConfig::load_hierarchy()?;
//!     let interval = config.apps.interval();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{AppsConfig, DisplayConfig, StressConfig};
pub use validation::validate_config;

impl StressConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }

    /// Layer `overrides` on top of this configuration.
    ///
    /// See [`loading::merge_configs`] for details.
    pub fn with_overrides(self, overrides: StressConfig) -> Self {
        loading::merge_configs(self, overrides)
    }
}
