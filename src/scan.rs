//! Docs tree scanning.
//!
//! Finds tooltip payload files in the generated documentation tree and
//! loads them into a [`TooltipRegistry`]:
//!
//! ```text
//! load_registry()
//!     │
//!     ├── collect_tooltip_files() ──► walkdir, suffix filter, sorted
//!     │
//!     ├── parse (rayon, per file) ──► payload::parse_payload
//!     │
//!     └── merge (sequential, path order) ──► registry.register
//! ```
//!
//! Parsing is parallel; the merge is sequential in sorted path order so a
//! namespace emitted by several files resolves deterministically
//! (last-write-wins, collision recorded in the report).

use crate::{
    config::TipsConfig,
    log,
    payload::{self, PayloadError, TooltipPayload},
    registry::TooltipRegistry,
};
use anyhow::Result;
use rayon::prelude::*;
use std::{fs, path::PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Why one payload file failed to load. The scan carries on past these;
/// `check` turns them into a nonzero exit.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Outcome of scanning one docs tree.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Number of payload files found.
    pub files: usize,
    /// Namespaces registered more than once (replaced, last file wins).
    pub replaced: Vec<String>,
    /// Files that could not be loaded.
    pub errors: Vec<(PathBuf, LoadError)>,
}

impl ScanReport {
    /// Whether `check` should fail for this tree.
    pub fn has_problems(&self) -> bool {
        !self.errors.is_empty() || !self.replaced.is_empty()
    }
}

/// Collect tooltip payload files under the configured docs dir.
///
/// Sorted for deterministic merge order.
pub fn collect_tooltip_files(config: &TipsConfig) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(&config.docs.dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name) && config.docs.matches(name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Scan the docs tree and build a registry from every payload file.
///
/// Unreadable or malformed files are reported, not fatal: the rest of the
/// tree still loads, mirroring how the page script would simply miss one
/// payload.
pub fn load_registry(config: &TipsConfig) -> Result<(TooltipRegistry, ScanReport)> {
    let files = collect_tooltip_files(config);

    let parsed: Vec<(PathBuf, Result<TooltipPayload, LoadError>)> = files
        .into_par_iter()
        .map(|path| {
            let result = fs::read_to_string(&path)
                .map_err(LoadError::from)
                .and_then(|source| payload::parse_payload(&source).map_err(LoadError::from));
            (path, result)
        })
        .collect();

    let mut registry = TooltipRegistry::new();
    let mut report = ScanReport {
        files: parsed.len(),
        ..ScanReport::default()
    };

    // par_iter preserves input order, so this merge runs in path order
    for (path, result) in parsed {
        match result {
            Ok(payload) => {
                if registry.register(payload.namespace.clone(), payload.entries).is_some() {
                    log!("scan"; "namespace `{}` re-registered by {}", payload.namespace, path.display());
                    report.replaced.push(payload.namespace);
                }
            }
            Err(err) => {
                log!("scan"; "skipping {}: {err}", path.display());
                report.errors.push((path, err));
            }
        }
    }

    Ok((registry, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn config_for(root: &Path) -> TipsConfig {
        let mut config = TipsConfig::default();
        config.docs.dir = root.to_path_buf();
        config
    }

    #[test]
    fn test_collect_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            &tmp.path().join("classes/SQF/Group-SummaryToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("SQFClass:Group",{});"#,
        );
        write_file(
            &tmp.path().join("classes/SQF/Unit-SummaryToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("SQFClass:Unit",{});"#,
        );
        write_file(&tmp.path().join("main.js"), "NDLoader.Start();");
        write_file(&tmp.path().join(".DS_Store"), "");

        let files = collect_tooltip_files(&config_for(tmp.path()));
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Group-SummaryToolTips.js", "Unit-SummaryToolTips.js"]);
    }

    #[test]
    fn test_load_registry_populates_namespaces() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            &tmp.path().join("Group-SummaryToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("SQFClass:Group",{212:"<div>Adds an existing Unit to this group.</div>"});"#,
        );
        write_file(
            &tmp.path().join("Unit-SummaryToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("SQFClass:Unit",{7:"<div>u</div>"});"#,
        );

        let (registry, report) = load_registry(&config_for(tmp.path())).unwrap();

        assert_eq!(report.files, 2);
        assert!(!report.has_problems());
        assert_eq!(registry.namespace_count(), 2);
        assert_eq!(
            registry.lookup("SQFClass:Group", 212),
            Some("<div>Adds an existing Unit to this group.</div>")
        );
        assert_eq!(registry.lookup("SQFClass:Unit", 7), Some("<div>u</div>"));
        assert_eq!(registry.lookup("SQFClass:Group", 999), None);
    }

    #[test]
    fn test_duplicate_namespace_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            &tmp.path().join("a-ToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("N",{1:"first"});"#,
        );
        write_file(
            &tmp.path().join("b-ToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("N",{2:"second"});"#,
        );

        let (registry, report) = load_registry(&config_for(tmp.path())).unwrap();

        // b-ToolTips.js sorts after a-ToolTips.js, so its entries win wholesale
        assert_eq!(registry.lookup("N", 1), None);
        assert_eq!(registry.lookup("N", 2), Some("second"));
        assert_eq!(report.replaced, vec!["N".to_string()]);
        assert!(report.has_problems());
    }

    #[test]
    fn test_malformed_file_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            &tmp.path().join("bad-ToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("Bad",{1:"unterminated});"#,
        );
        write_file(
            &tmp.path().join("good-ToolTips.js"),
            r#"NDSummary.OnToolTipsLoaded("Good",{1:"ok"});"#,
        );

        let (registry, report) = load_registry(&config_for(tmp.path())).unwrap();

        assert_eq!(registry.namespace_count(), 1);
        assert_eq!(registry.lookup("Good", 1), Some("ok"));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].0.ends_with("bad-ToolTips.js"));
    }

    #[test]
    fn test_empty_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let (registry, report) = load_registry(&config_for(tmp.path())).unwrap();

        assert!(registry.is_empty());
        assert_eq!(report.files, 0);
        assert!(!report.has_problems());
    }
}
