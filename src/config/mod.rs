//! Tool configuration management for `ndtips.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                        |
//! |-----------|------------------------------------------------|
//! | `[base]`  | Documentation set metadata (title, description)|
//! | `[docs]`  | Docs tree location and payload file suffixes   |
//! | `[serve]` | Tooltip API server (port, interface, watch)    |
//! | `[extra]` | User-defined custom fields                     |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Vindicta API"
//!
//! [docs]
//! dir = "HTML"
//! suffixes = ["SummaryToolTips.js", "ToolTips.js"]
//!
//! [serve]
//! port = 5280
//! ```
//!
//! The config file is optional: when `ndtips.toml` is absent the tool runs
//! with defaults, taking the root and docs dir from CLI flags.

mod base;
pub mod defaults;
mod docs;
mod error;
mod handle;
mod serve;

pub use handle::{cfg, init_config};

use base::BaseConfig;
use docs::DocsConfig;
use error::ConfigError;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing ndtips.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct TipsConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Documentation set metadata
    #[serde(default)]
    pub base: BaseConfig,

    /// Docs tree settings
    #[serde(default)]
    pub docs: DocsConfig,

    /// Tooltip API server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl TipsConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: TipsConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.docs.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.docs.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.update_path_with_root(cli, &root);

        if let Commands::Serve {
            interface,
            port,
            watch,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root and normalize to absolute paths
    fn update_path_with_root(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.docs.dir, cli.docs.as_ref());

        let root = Self::normalize_path(root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.docs.dir = Self::normalize_path(&root.join(&self.docs.dir));
        self.set_root(&root);
    }

    /// Expand `~` and make a path absolute. Does not touch the filesystem,
    /// so nonexistent paths normalize too (validation reports those).
    fn normalize_path(path: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let expanded = PathBuf::from(expanded);
        std::path::absolute(&expanded).unwrap_or(expanded)
    }

    /// Validate config state before running a command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.docs.dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "docs directory not found: {}",
                self.docs.dir.display()
            )));
        }

        if self.docs.suffixes.is_empty() || self.docs.suffixes.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "[docs] suffixes must be a non-empty list of non-empty strings".into(),
            ));
        }

        if self.serve.interface.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "invalid [serve] interface: {}",
                self.serve.interface
            )));
        }

        Ok(())
    }
}
