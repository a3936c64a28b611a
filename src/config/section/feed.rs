//! `[feed]` section: channel metadata and output document.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Feed output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// RSS 2.0 format (default).
    #[default]
    Rss,
    /// Atom 1.0 format.
    Atom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSectionConfig {
    pub title: String,
    pub description: String,
    /// Canonical site URL, also the base of every item link.
    pub link: String,
    pub format: FeedFormat,
    /// Output file for the rendered document.
    pub path: PathBuf,
    pub minify: bool,
}

impl Default for FeedSectionConfig {
    fn default() -> Self {
        Self {
            title: "KittenBot".into(),
            description: "Daily AI Generated Kittens".into(),
            link: "https://kittenbot.io".into(),
            format: FeedFormat::Rss,
            path: "feed.xml".into(),
            minify: false,
        }
    }
}

impl FeedSectionConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.title.trim().is_empty() {
            diag.error(FieldPath::new("feed.title"), "title must not be empty");
        }

        match url::Url::parse(&self.link) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(url) => diag.error_with_hint(
                FieldPath::new("feed.link"),
                format!("unsupported link `{url}`"),
                "use an absolute http(s) URL, e.g. \"https://kittenbot.io\"",
            ),
            Err(e) => diag.error_with_hint(
                FieldPath::new("feed.link"),
                format!("invalid link `{}`: {e}", self.link),
                "use an absolute http(s) URL, e.g. \"https://kittenbot.io\"",
            ),
        }

        if self.path.as_os_str().is_empty() {
            diag.error(FieldPath::new("feed.path"), "output path must not be empty");
        }
    }
}
