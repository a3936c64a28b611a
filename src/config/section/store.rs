//! `[store]` section: where artifacts live and which keys count.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSectionConfig {
    /// Directory used as the bucket, relative to the config file.
    pub root: PathBuf,
    /// Artifact extension, without the dot.
    pub extension: String,
    /// Stem of the alias key that always points at the newest artifact.
    pub alias: String,
    /// Keys requested per listing page.
    pub page_size: usize,
    /// List only keys newer than this many days; 0 lists everything.
    pub lookback_days: u32,
}

impl Default for StoreSectionConfig {
    fn default() -> Self {
        Self {
            root: "bucket".into(),
            extension: "png".into(),
            alias: "latest".into(),
            page_size: 1000,
            lookback_days: 30,
        }
    }
}

impl StoreSectionConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extension.is_empty() || !self.extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            diag.error_with_hint(
                FieldPath::new("store.extension"),
                format!("invalid extension `{}`", self.extension),
                "use letters and digits only, without the dot, e.g. \"png\"",
            );
        }
        if self.alias.is_empty() {
            diag.error(FieldPath::new("store.alias"), "alias must not be empty");
        }
        if self.page_size == 0 {
            diag.error(FieldPath::new("store.page_size"), "page size must be at least 1");
        }
    }
}
