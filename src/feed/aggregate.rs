//! Fan-in collection point.
//!
//! Producers hold a [`Collector`] (a bounded channel sender) and push items
//! as they are fetched. A single consumer task owns the growing `Vec`, so the
//! collection itself is never shared. [`Aggregator::finish`] is the drain
//! barrier: it closes the last sender and waits until every sent item has
//! been appended.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{FeedError, FeedItem};
use crate::debug;
use crate::logger::Logger;

/// Largest fan-in buffer accepted from configuration.
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Sending half handed to producers. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Collector {
    tx: mpsc::Sender<FeedItem>,
}

impl Collector {
    /// Push one item, waiting while the channel is full.
    pub async fn send(&self, item: FeedItem) -> Result<(), FeedError> {
        self.tx
            .send(item)
            .await
            .map_err(|_| FeedError::TaskFailed("aggregator stopped".into()))
    }
}

/// Owner of the consumer task.
#[derive(Debug)]
pub struct Aggregator {
    handle: JoinHandle<Vec<FeedItem>>,
}

impl Aggregator {
    /// Start the consumer task. `capacity` is clamped to
    /// `1..=MAX_CHANNEL_CAPACITY`.
    pub fn spawn(capacity: usize, logger: Logger) -> (Self, Collector) {
        let capacity = capacity.clamp(1, MAX_CHANNEL_CAPACITY);
        let (tx, mut rx) = mpsc::channel::<FeedItem>(capacity);

        let handle = tokio::spawn(async move {
            let mut items = Vec::new();
            while let Some(item) = rx.recv().await {
                items.push(item);
            }
            debug!(logger; "aggregate"; "channel closed after {} items", items.len());
            items
        });

        (Self { handle }, Collector { tx })
    }

    /// Close `collector` and wait for the consumer to drain the channel.
    ///
    /// Every other clone of the collector must already be dropped, i.e. all
    /// producers joined; otherwise this waits for them.
    pub async fn finish(self, collector: Collector) -> Result<Vec<FeedItem>, FeedError> {
        drop(collector);
        Ok(self.handle.await?)
    }
}
