//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "API documentation".into()
    }
}

// ============================================================================
// [docs] Section Defaults
// ============================================================================

pub mod docs {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn dir() -> PathBuf {
        "docs".into()
    }

    /// Natural Docs names its payload files `<Class>-SummaryToolTips.js`
    /// and `<Page>-ToolTips.js`; one suffix covers both.
    pub fn suffixes() -> Vec<String> {
        vec!["ToolTips.js".into()]
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5280
    }
}
