//! File system watcher for live registry reload.
//!
//! Monitors the docs tree for changes to tooltip payload files and
//! re-scans into a fresh registry, swapped in atomically through the
//! server's [`RegistryHandle`]:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────────────────────┐
//! │ notify   │───▶│ Debouncer│───▶│ scan::load_registry()     │
//! │ events   │    │ (300ms)  │    │   └─ handle.replace(...)  │
//! └──────────┘    └──────────┘    └───────────────────────────┘
//! ```
//!
//! Generators rewrite many payload files in one run; debouncing plus a
//! cooldown collapses that burst into a single re-scan.

use crate::{config::cfg, log, scan, serve::RegistryHandle};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const RESCAN_COOLDOWN_MS: u64 = 800;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Whether a changed path can affect the registry.
fn is_payload_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    cfg().docs.matches(name)
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and re-scan cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rescan: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_rescan: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_rescan
            .is_some_and(|t| t.elapsed() < Duration::from_millis(RESCAN_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) && is_payload_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn mark_rescan(&mut self) {
        self.last_rescan = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

/// Re-scan the whole docs tree and swap the registry.
///
/// Always a full re-scan: registration is whole-namespace replacement, and
/// a deleted file must drop the namespace it owned. Returns true on
/// success (for cooldown).
fn try_rescan(handle: &RegistryHandle, changed: usize) -> bool {
    log!("watch"; "{changed} payload file(s) changed, re-scanning...");

    match scan::load_registry(&cfg()) {
        Ok((registry, report)) => {
            log!(
                "watch";
                "reloaded {} namespaces, {} tooltips ({} files)",
                registry.namespace_count(),
                registry.entry_count(),
                report.files
            );
            handle.replace(registry);
            true
        }
        Err(e) => {
            log!("watch"; "re-scan failed: {e}");
            false
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and live registry reload.
pub fn watch_for_changes_blocking(handle: RegistryHandle) -> Result<()> {
    let docs_dir = cfg().docs.dir.clone();

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(&docs_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", docs_dir.display()))?;

    log!("watch"; "watching {}", docs_dir.display());

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) && !debouncer.in_cooldown() => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                let changed = debouncer.take();
                if try_rescan(&handle, changed.len()) {
                    debouncer.mark_rescan();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            // Other cases: irrelevant events, timeout without ready, etc.
            _ => {}
        }
    }

    Ok(())
}
