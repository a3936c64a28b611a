//! Wiring of the assembly stages.
//!
//! One invocation runs the stages in this order, each one on the shared
//! [`TaskGroup`] token:
//!
//! 1. **Listing**: pages are requested one by one; each accepted key spawns a
//!    producer as soon as its page arrives.
//! 2. **Fetching**: producers look up metadata and push items to the
//!    [`Collector`].
//! 3. **Draining**: once every producer is joined, the collector is closed
//!    and the aggregator hands back the items.
//! 4. **Sorting** and **Serializing** run on the caller's task.
//!
//! The first error from any stage cancels everything still running; the
//! invocation waits for all tasks to stop before it reports that error.

use std::fmt;
use std::sync::Arc;

use super::{Aggregator, Collector, Feed, FeedError, FeedOptions, KeyFilter, Lister, fetch_item};
use crate::core::{CancelToken, Clock, TaskGroup};
use crate::generator;
use crate::logger::Logger;
use crate::store::ObjectStore;
use crate::{debug, log};

/// Assembly stage, used for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Listing,
    /// Entered at the first spawned producer; listing may still be running.
    Fetching,
    Draining,
    Sorting,
    Serializing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Listing => "listing",
            Self::Fetching => "fetching",
            Self::Draining => "draining",
            Self::Sorting => "sorting",
            Self::Serializing => "serializing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Builds feeds from an object store.
///
/// Holds no per-invocation state: concurrent calls to [`generate`] share
/// nothing but the store, clock and logger.
///
/// [`generate`]: FeedGenerator::generate
pub struct FeedGenerator {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    logger: Logger,
    options: FeedOptions,
}

impl FeedGenerator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        logger: Logger,
        options: FeedOptions,
    ) -> Self {
        Self {
            store,
            clock,
            logger,
            options,
        }
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    /// Assemble and serialize the feed.
    ///
    /// Cancelling `token` stops the invocation with [`FeedError::Cancelled`]
    /// unless some task already failed on its own.
    pub async fn generate(&self, token: &CancelToken) -> Result<Vec<u8>, FeedError> {
        let feed = self.assemble(token).await?;

        self.stage(Stage::Serializing);
        let bytes = generator::render(&feed, self.options.format, self.options.minify)
            .inspect_err(|e| self.report_failure(e))?;

        self.stage(Stage::Done);
        log!(self.logger; "feed"; "{} items, {} bytes", feed.items.len(), bytes.len());
        Ok(bytes)
    }

    /// Run every stage up to sorting and return the in-memory feed.
    pub async fn assemble(&self, token: &CancelToken) -> Result<Feed, FeedError> {
        let started = self.clock.now();
        let mut feed = Feed::new(&self.options, started);
        let filter = KeyFilter::new(&self.options.extension, &self.options.alias)?;

        let (aggregator, collector) =
            Aggregator::spawn(self.options.channel_capacity, self.logger.clone());
        let mut group: TaskGroup<FeedError> = TaskGroup::new(token);

        self.stage(Stage::Listing);
        let spawned = self.list_and_spawn(&mut group, &filter, &collector, started).await;

        let joined = group.wait().await;

        // Producers are gone: closing the last sender ends the aggregator
        self.stage(Stage::Draining);
        let drained = aggregator.finish(collector).await;

        let items = match joined.and(drained) {
            Ok(items) => items,
            Err(err) => {
                self.report_failure(&err);
                return Err(err);
            }
        };
        debug!(self.logger; "feed"; "collected {} of {} accepted keys", items.len(), spawned);

        self.stage(Stage::Sorting);
        feed.items = items;
        feed.sort_items();
        Ok(feed)
    }

    /// Walk the listing, spawning one producer per accepted key. Returns the
    /// number of producers spawned. Failures are recorded on `group`.
    async fn list_and_spawn(
        &self,
        group: &mut TaskGroup<FeedError>,
        filter: &KeyFilter,
        collector: &Collector,
        now: std::time::SystemTime,
    ) -> usize {
        let start_after = self.options.start_after(now);
        if let Some(after) = &start_after {
            debug!(self.logger; "list"; "listing keys after {}", after);
        }

        let token = group.token().clone();
        let mut lister = Lister::new(self.store.as_ref(), start_after, self.options.page_size);
        let mut spawned = 0;

        loop {
            let entries = match token.run_until_cancelled(lister.next_page()).await {
                Ok(Ok(Some(entries))) => entries,
                Ok(Ok(None)) | Err(_) => break,
                Ok(Err(err)) => {
                    group.fail(FeedError::Listing(err));
                    break;
                }
            };
            debug!(self.logger; "list"; "page {} with {} keys", lister.pages(), entries.len());

            for entry in entries {
                if !filter.accepts(&entry.key) {
                    debug!(self.logger; "filter"; "skipped {}", entry.key);
                    continue;
                }

                if spawned == 0 {
                    self.stage(Stage::Fetching);
                }
                let store = Arc::clone(&self.store);
                let collector = collector.clone();
                let base_link = self.options.link.clone();
                group.spawn(async move {
                    let item = fetch_item(store.as_ref(), &entry.key, &base_link).await?;
                    collector.send(item).await
                });
                spawned += 1;
            }
        }

        spawned
    }

    fn stage(&self, stage: Stage) {
        debug!(self.logger; "stage"; "{}", stage);
    }

    fn report_failure(&self, err: &FeedError) {
        debug!(self.logger; "stage"; "{}", Stage::Failed);
        log!(self.logger; "error"; "{}", error_chain(err));
    }
}

/// Render an error with its sources, `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Listing.to_string(), "listing");
        assert_eq!(Stage::Failed.to_string(), "failed");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = FeedError::Metadata {
            key: "20240101.png".into(),
            source: StoreError::NotFound("20240101.png".into()),
        };
        assert_eq!(
            error_chain(&err),
            "fetching metadata for `20240101.png` failed: object `20240101.png` not found"
        );
    }
}
