//! `[base]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in ndtips.toml - documentation set metadata.
///
/// Shown in the serve index response and scan summaries.
///
/// # Example
/// ```toml
/// [base]
/// title = "Vindicta API"
/// description = "Generated SQF class reference"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Title of the documentation set.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,
}
