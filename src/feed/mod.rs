//! Feed assembly.
//!
//! Turns an object store listing into a syndication document:
//!
//! ```text
//! Lister ──> KeyFilter ──> fetch (one task per key) ──> Aggregator ──> sort ──> render
//! (pages)    (dated keys)   (concurrent, cancellable)    (single consumer)
//! ```
//!
//! # Module Structure
//!
//! - `lister` - Paginated walk over the store
//! - `filter` - Dated-artifact key predicate
//! - `fetch` - Per-key metadata lookup into a [`FeedItem`]
//! - `aggregate` - Fan-in collection point and its consumer task
//! - `pipeline` - [`FeedGenerator`], wiring the stages together

mod aggregate;
mod fetch;
mod filter;
mod lister;
mod pipeline;

#[cfg(test)]
mod tests;

pub use aggregate::{Aggregator, Collector, MAX_CHANNEL_CAPACITY};
pub use fetch::fetch_item;
pub use filter::KeyFilter;
pub use lister::Lister;
pub use pipeline::{FeedGenerator, Stage};

use std::time::SystemTime;

use thiserror::Error;
use tokio::task::JoinError;

use crate::config::{FeedFormat, FeedToolConfig};
use crate::core::Cancelled;
use crate::store::{ObjectMetadata, StoreError};
use crate::utils::date::stamp_days_before;

/// Separator between prompt, model and seed in item titles.
pub const TITLE_DELIMITER: &str = ":";

// ============================================================================
// Errors
// ============================================================================

/// Feed assembly errors. The first one raised ends the invocation.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("listing objects failed")]
    Listing(#[source] StoreError),

    #[error("fetching metadata for `{key}` failed")]
    Metadata {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("feed serialization failed: {0}")]
    Serialization(String),

    #[error("feed assembly cancelled")]
    Cancelled,

    #[error("feed task failed: {0}")]
    TaskFailed(String),

    #[error("invalid artifact key pattern")]
    Pattern(#[from] regex::Error),
}

impl From<Cancelled> for FeedError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<JoinError> for FeedError {
    fn from(err: JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}

// ============================================================================
// Feed model
// ============================================================================

/// One published artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    title: String,
    link: String,
    updated: SystemTime,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>, updated: SystemTime) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            updated,
        }
    }

    /// Build the item for `key` from its stored metadata.
    ///
    /// Title is `prompt:model:seed` (absent attributes render empty), link is
    /// `base_link/key`, updated is the object's last-modified time.
    pub fn from_metadata(key: &str, meta: &ObjectMetadata, base_link: &str) -> Self {
        let title = [
            meta.attribute("prompt"),
            meta.attribute("model"),
            meta.attribute("seed"),
        ]
        .join(TITLE_DELIMITER);
        let link = format!("{}/{}", base_link.trim_end_matches('/'), key);

        Self::new(title, link, meta.last_modified)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn updated(&self) -> SystemTime {
        self.updated
    }
}

/// Channel metadata plus the collected items.
#[derive(Debug, Clone)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Wall-clock time the assembly started.
    pub updated: SystemTime,
    pub items: Vec<FeedItem>,
}

impl Feed {
    pub fn new(options: &FeedOptions, updated: SystemTime) -> Self {
        Self {
            title: options.title.clone(),
            description: options.description.clone(),
            link: options.link.clone(),
            updated,
            items: Vec::new(),
        }
    }

    /// Order items by ascending `updated`. Ties keep no particular order.
    pub fn sort_items(&mut self) {
        self.items.sort_unstable_by_key(FeedItem::updated);
    }
}

// ============================================================================
// Options
// ============================================================================

/// Everything a [`FeedGenerator`] needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub title: String,
    pub description: String,
    /// Canonical base URL; item links are `link/key`.
    pub link: String,
    /// Artifact file extension, without the dot.
    pub extension: String,
    /// Stem of the alias key (`latest` → `latest.png`).
    pub alias: String,
    pub page_size: usize,
    /// Only list keys from this many days back; 0 lists everything.
    pub lookback_days: u32,
    /// Capacity of the fan-in channel.
    pub channel_capacity: usize,
    pub format: FeedFormat,
    pub minify: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            title: "KittenBot".into(),
            description: "Daily AI Generated Kittens".into(),
            link: "https://kittenbot.io".into(),
            extension: "png".into(),
            alias: "latest".into(),
            page_size: 1000,
            lookback_days: 30,
            channel_capacity: 16,
            format: FeedFormat::Rss,
            minify: false,
        }
    }
}

impl FeedOptions {
    pub fn from_config(config: &FeedToolConfig) -> Self {
        Self {
            title: config.feed.title.clone(),
            description: config.feed.description.clone(),
            link: config.feed.link.clone(),
            extension: config.store.extension.clone(),
            alias: config.store.alias.clone(),
            page_size: config.store.page_size,
            lookback_days: config.store.lookback_days,
            channel_capacity: config.pipeline.channel_capacity,
            format: config.feed.format,
            minify: config.feed.minify,
        }
    }

    /// Listing cursor for the look-back window, e.g. `20240101.png`.
    pub fn start_after(&self, now: SystemTime) -> Option<String> {
        (self.lookback_days > 0)
            .then(|| format!("{}.{}", stamp_days_before(now, self.lookback_days), self.extension))
    }
}
