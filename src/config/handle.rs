//! Global config read handle.
//!
//! Uses `arc-swap` for lock-free reads. The config is loaded once in main
//! and read from the scan/serve/watch paths; the watcher thread reads it
//! concurrently with the request loop.
//!
//! # Usage
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! scan::load_registry(&c)?;  // Arc auto-derefs to &TipsConfig
//! ```

use super::TipsConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
///
/// Initialized with default config, then replaced with the loaded config
/// in main before any command runs.
pub static CONFIG: LazyLock<ArcSwap<TipsConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(TipsConfig::default()));

/// Get current config as `Arc<TipsConfig>`.
///
/// Thread-safe and wait-free; the Arc auto-derefs to `&TipsConfig`.
#[inline]
pub fn cfg() -> Arc<TipsConfig> {
    CONFIG.load_full()
}

/// Initialize global config (called once at startup).
#[inline]
pub fn init_config(config: TipsConfig) {
    CONFIG.store(Arc::new(config));
}
