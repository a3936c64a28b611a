//! `keys` command: show how the key filter classifies a store listing.

use anyhow::{Context, Result};

use crate::config::FeedToolConfig;
use crate::core::{CancelToken, Clock, SystemClock};
use crate::feed::{FeedError, FeedOptions, KeyFilter, Lister};
use crate::log;
use crate::logger::Logger;
use crate::store::{FsStore, ObjectStore};

/// Listed keys, split by the filter verdict. Both lists keep listing order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct KeyReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
}

/// Walk the whole listing and classify every key.
pub async fn classify_keys(
    store: &dyn ObjectStore,
    options: &FeedOptions,
    start_after: Option<String>,
    token: &CancelToken,
) -> Result<KeyReport, FeedError> {
    let filter = KeyFilter::new(&options.extension, &options.alias)?;
    let mut lister = Lister::new(store, start_after, options.page_size);
    let mut report = KeyReport::default();

    while let Some(entries) = token
        .run_until_cancelled(lister.next_page())
        .await?
        .map_err(FeedError::Listing)?
    {
        for entry in entries {
            if filter.accepts(&entry.key) {
                report.accepted.push(entry.key);
            } else {
                report.rejected.push(entry.key);
            }
        }
    }
    Ok(report)
}

/// Print the classification of the configured store.
pub fn list_keys(
    config: &FeedToolConfig,
    show_rejected: bool,
    logger: &Logger,
    token: &CancelToken,
) -> Result<KeyReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let store = FsStore::new(&config.store.root);
    let options = FeedOptions::from_config(config);
    let start_after = options.start_after(SystemClock.now());

    let report = runtime
        .block_on(classify_keys(&store, &options, start_after, token))
        .with_context(|| format!("Failed to list '{}'", store.root().display()))?;

    for key in &report.accepted {
        println!("{key}");
    }
    if show_rejected {
        for key in &report.rejected {
            log!(logger; "skip"; "{}", key);
        }
    }
    log!(logger; "keys"; "{} accepted, {} rejected", report.accepted.len(), report.rejected.len());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use std::time::UNIX_EPOCH;

    fn store() -> MemoryStore {
        ["20240101.png", "20240102.png", "latest.png", "notes.txt", "202401021.png"]
            .into_iter()
            .fold(MemoryStore::new(), |store, key| store.with_object(key, UNIX_EPOCH, []))
    }

    fn small_pages() -> FeedOptions {
        FeedOptions {
            page_size: 2,
            ..FeedOptions::default()
        }
    }

    #[tokio::test]
    async fn test_classify_keys() {
        let report = classify_keys(&store(), &small_pages(), None, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(report.accepted, ["20240101.png", "20240102.png"]);
        assert_eq!(report.rejected, ["202401021.png", "latest.png", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_classify_respects_start_after() {
        let report = classify_keys(
            &store(),
            &small_pages(),
            Some("20240101.png".into()),
            &CancelToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.accepted, ["20240102.png"]);
    }

    #[tokio::test]
    async fn test_classify_listing_error() {
        let failing = store().fail_listing_at(1);
        let err = classify_keys(&failing, &small_pages(), None, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Listing(StoreError::Request(_))));
    }

    #[tokio::test]
    async fn test_classify_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let err = classify_keys(&store(), &small_pages(), None, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Cancelled));
    }
}
