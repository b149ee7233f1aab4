//! `[docs]` section configuration.
//!
//! Points at the generated documentation tree and describes which files in
//! it carry tooltip payloads.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[docs]` section in ndtips.toml - location of the generated docs.
///
/// # Example
/// ```toml
/// [docs]
/// dir = "HTML"
/// suffixes = ["SummaryToolTips.js", "ToolTips.js"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Project root. Usually unset; resolved from the CLI `--root` flag
    /// and normalized to an absolute path at load time.
    #[serde(default = "defaults::docs::root")]
    #[educe(Default = defaults::docs::root())]
    pub root: Option<PathBuf>,

    /// Documentation tree, relative to root (default: `docs`).
    /// Normalized to an absolute path at load time.
    #[serde(default = "defaults::docs::dir")]
    #[educe(Default = defaults::docs::dir())]
    pub dir: PathBuf,

    /// Filename suffixes identifying tooltip payload files.
    #[serde(default = "defaults::docs::suffixes")]
    #[educe(Default = defaults::docs::suffixes())]
    pub suffixes: Vec<String>,
}

impl DocsConfig {
    /// Check whether a filename is a tooltip payload file.
    pub fn matches(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}
