//! In-memory object store.
//!
//! Keeps objects in a sorted map. Metadata lookups can be slowed down and
//! made to fail per key, which drives the pipeline's concurrency paths in
//! tests. Injected failures are immediate; only successful lookups wait.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use super::{ListEntry, ListPage, ListRequest, ObjectMetadata, ObjectStore, StoreError, paginate};

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, ObjectMetadata>,
    latency: Duration,
    jitter: Duration,
    failing_keys: HashSet<String>,
    failing_page: Option<usize>,
    list_calls: AtomicUsize,
    head_calls: AtomicUsize,
    heads_completed: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object with the given attributes.
    pub fn with_object<'a>(
        mut self,
        key: impl Into<String>,
        last_modified: SystemTime,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let attributes: HashMap<String, String> = attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.objects.insert(
            key.into(),
            ObjectMetadata {
                last_modified,
                attributes,
            },
        );
        self
    }

    /// Delay every successful metadata lookup by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Add a key-dependent delay in `[0, jitter)` to metadata lookups, so
    /// concurrent lookups complete out of key order.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Make `head_object(key)` fail without delay.
    pub fn fail_metadata(mut self, key: impl Into<String>) -> Self {
        self.failing_keys.insert(key.into());
        self
    }

    /// Make the `index`-th `list_page` call (zero-based) fail.
    pub fn fail_listing_at(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }

    /// Number of `list_page` calls made so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `head_object` calls started so far.
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    /// Number of `head_object` calls that ran to completion.
    pub fn heads_completed(&self) -> usize {
        self.heads_completed.load(Ordering::SeqCst)
    }

    fn delay_for(&self, key: &str) -> Duration {
        if self.jitter.is_zero() {
            return self.latency;
        }
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let span = self.jitter.as_micros().max(1) as u64;
        self.latency + Duration::from_micros(hasher.finish() % span)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(&self, request: ListRequest) -> Result<ListPage, StoreError> {
        let index = self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing_page == Some(index) {
            return Err(StoreError::Request(format!("listing page {index} failed")));
        }

        let sorted: Vec<(String, ())> = self.objects.keys().map(|k| (k.clone(), ())).collect();
        let (page, next_continuation) = paginate(&sorted, &request);

        Ok(ListPage {
            entries: page
                .iter()
                .map(|(key, ())| ListEntry {
                    key: key.clone(),
                    size: 0,
                })
                .collect(),
            next_continuation,
        })
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.contains(key) {
            self.heads_completed.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Request(format!("head `{key}` failed")));
        }

        let delay = self.delay_for(key);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = self
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()));
        self.heads_completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
