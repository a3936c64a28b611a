//! Tool configuration management for `kittenfeed.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── feed       # [feed]
//! │   ├── store      # [store]
//! │   └── pipeline   # [pipeline]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # FeedToolConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `[feed]`     | Title, description, link, format, output path     |
//! | `[store]`    | Bucket root, artifact extension, alias, paging    |
//! | `[pipeline]` | Fan-in channel capacity                           |
//!
//! Every field has a default, so a missing config file is not an error.

pub mod section;
pub mod types;
mod util;

pub use section::{FeedFormat, FeedSectionConfig, PipelineConfig, StoreSectionConfig};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{BuildArgs, KeysArgs};
use crate::logger::Logger;
use crate::{debug, log};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kittenfeed.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedToolConfig {
    /// Absolute path of the loaded file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub feed: FeedSectionConfig,

    #[serde(default)]
    pub store: StoreSectionConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl FeedToolConfig {
    /// Locate and load `config_name`, searching upward from `cwd`.
    ///
    /// Relative paths inside the file resolve against the file's directory;
    /// without a file they resolve against `cwd`.
    pub fn load(config_name: &Path, cwd: &Path, logger: &Logger) -> Result<Self, ConfigError> {
        let Some(path) = find_config_file(config_name, cwd) else {
            debug!(logger; "config"; "{} not found, using defaults", config_name.display());
            let mut config = Self::default();
            config.resolve_paths(cwd);
            return Ok(config);
        };

        let mut config = Self::from_path(&path, logger)?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.resolve_paths(&root);
        config.config_path = path;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path, warning about unknown fields.
    pub fn from_path(path: &Path, logger: &Logger) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!(logger; "warning"; "unknown fields in {}, ignoring: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn resolve_paths(&mut self, root: &Path) {
        self.store.root = util::resolve_against(root, &self.store.root);
        self.feed.path = util::resolve_against(root, &self.feed.path);
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI. Paths given on the command line stay
    /// relative to the current directory.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.store.root, args.store.as_ref());
        Self::update_option(&mut self.feed.path, args.output.as_ref());
        Self::update_option(&mut self.feed.format, args.format.as_ref());
        Self::update_option(&mut self.feed.minify, args.minify.as_ref());
        Self::update_option(&mut self.store.lookback_days, args.lookback_days.as_ref());
    }

    /// Apply keys arguments from CLI.
    pub fn apply_keys_args(&mut self, args: &KeysArgs) {
        Self::update_option(&mut self.store.root, args.store.as_ref());
        Self::update_option(&mut self.store.lookback_days, args.lookback_days.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate every section, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.feed.validate(&mut diag);
        self.store.validate(&mut diag);
        self.pipeline.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content on top of defaults.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> FeedToolConfig {
    let (parsed, ignored) = FeedToolConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
