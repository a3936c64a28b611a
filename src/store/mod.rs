//! Object store abstraction.
//!
//! The feed pipeline needs two operations from a bucket:
//!
//! - `list_page`: one page of keys, in byte-wise key order, with an optional
//!   continuation for the next page
//! - `head_object`: per-object metadata (attributes + last-modified)
//!
//! # Module Structure
//!
//! - `memory` - In-memory store with latency and fault injection
//! - `fs` - Directory-backed store with JSON metadata sidecars

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::SystemTime;
use thiserror::Error;

/// Object store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(String),

    #[error("IO error when accessing `{0}`")]
    Io(String, #[source] std::io::Error),

    #[error("invalid metadata for `{key}`: {reason}")]
    Metadata { key: String, reason: String },

    #[error("store request failed: {0}")]
    Request(String),
}

/// Parameters of one `list_page` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys strictly greater than this one.
    pub start_after: Option<String>,
    /// Opaque token returned by the previous page.
    pub continuation: Option<String>,
    /// Upper bound on entries per page.
    pub max_keys: usize,
}

/// One key of a listing, without per-object metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub key: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub entries: Vec<ListEntry>,
    /// `Some` while more pages remain.
    pub next_continuation: Option<String>,
}

impl ListPage {
    pub fn has_more(&self) -> bool {
        self.next_continuation.is_some()
    }
}

/// Metadata attached to an object at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub last_modified: SystemTime,
    pub attributes: HashMap<String, String>,
}

impl ObjectMetadata {
    /// Attribute value, or `""` when absent.
    pub fn attribute(&self, name: &str) -> &str {
        self.attributes.get(name).map_or("", String::as_str)
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_page(&self, request: ListRequest) -> Result<ListPage, StoreError>;

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StoreError>;
}

/// Cut one page out of a sorted key list.
///
/// Shared by the bundled stores: the continuation token is the last key of
/// the previous page, and it takes precedence over `start_after`.
fn paginate<'a, T>(sorted: &'a [(String, T)], request: &ListRequest) -> (&'a [(String, T)], Option<String>) {
    let after = request
        .continuation
        .as_deref()
        .or(request.start_after.as_deref());

    let start = match after {
        Some(after) => sorted.partition_point(|(key, _)| key.as_str() <= after),
        None => 0,
    };
    let max_keys = request.max_keys.max(1);
    let end = start.saturating_add(max_keys).min(sorted.len());
    let page = &sorted[start..end];

    let next = (end < sorted.len())
        .then(|| page.last().map(|(key, _)| key.clone()))
        .flatten();
    (page, next)
}
