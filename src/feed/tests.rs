//! End-to-end assembly over [`MemoryStore`].

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::*;
use crate::config::FeedFormat;
use crate::core::{CancelToken, FixedClock};
use crate::logger::Logger;
use crate::logger::tests::Captured;
use crate::store::{MemoryStore, ObjectStore, StoreError};

/// 2024-03-01T10:00:00Z
const NOW: u64 = 1_709_287_200;

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn options() -> FeedOptions {
    FeedOptions {
        lookback_days: 0,
        ..FeedOptions::default()
    }
}

fn generator_with(store: &Arc<MemoryStore>, options: FeedOptions) -> FeedGenerator {
    FeedGenerator::new(
        Arc::clone(store) as Arc<dyn ObjectStore>,
        Arc::new(FixedClock(at(NOW))),
        Logger::discard(),
        options,
    )
}

/// `count` dated keys, modified in reverse key order.
fn dated_store(count: u64) -> MemoryStore {
    (0..count).fold(MemoryStore::new(), |store, n| {
        let key = format!("{:08}.png", 20_000_000 + n);
        let seed = n.to_string();
        store.with_object(
            key,
            at(1_000_000 - n),
            [("prompt", "kitten"), ("model", "m"), ("seed", seed.as_str())],
        )
    })
}

fn assert_sorted(feed: &Feed) {
    assert!(
        feed.items
            .windows(2)
            .all(|pair| pair[0].updated() <= pair[1].updated())
    );
}

fn titles(feed: &Feed) -> Vec<&str> {
    feed.items.iter().map(FeedItem::title).collect()
}

#[tokio::test]
async fn test_two_items_in_update_order() {
    let store = Arc::new(
        MemoryStore::new()
            .with_object(
                "20240102.png",
                at(200),
                [("prompt", "b"), ("model", "m2"), ("seed", "2")],
            )
            .with_object(
                "20240101.png",
                at(100),
                [("prompt", "a"), ("model", "m1"), ("seed", "1")],
            ),
    );
    let generator = generator_with(&store, options());

    let feed = generator.assemble(&CancelToken::new()).await.unwrap();

    assert_eq!(titles(&feed), ["a:m1:1", "b:m2:2"]);
    assert_eq!(feed.items[0].link(), "https://kittenbot.io/20240101.png");
    assert_eq!(feed.items[1].link(), "https://kittenbot.io/20240102.png");
    assert_eq!(feed.updated, at(NOW));
    assert_eq!(feed.title, "KittenBot");
}

#[tokio::test]
async fn test_only_dated_keys_become_items() {
    let store = Arc::new(
        dated_store(5)
            .with_object("latest.png", at(1), [])
            .with_object("202401011.png", at(1), [])
            .with_object("20240101.jpg", at(1), [])
            .with_object("index.html", at(1), []),
    );
    let generator = generator_with(&store, options());

    let feed = generator.assemble(&CancelToken::new()).await.unwrap();

    assert_eq!(feed.items.len(), 5);
    assert!(feed.items.iter().all(|item| !item.link().contains("latest")));
    // rejected keys are never looked up
    assert_eq!(store.head_calls(), 5);
}

#[tokio::test]
async fn test_alias_alone_gives_empty_feed() {
    let store = Arc::new(MemoryStore::new().with_object("latest.png", at(1), []));
    let generator = generator_with(&store, options());

    let feed = generator.assemble(&CancelToken::new()).await.unwrap();
    assert!(feed.items.is_empty());
    assert_eq!(store.head_calls(), 0);
}

#[tokio::test]
async fn test_empty_store_renders_valid_rss() {
    let store = Arc::new(MemoryStore::new());
    let generator = generator_with(&store, options());

    let bytes = generator.generate(&CancelToken::new()).await.unwrap();
    let xml = String::from_utf8(bytes).unwrap();

    assert!(xml.contains("<channel>"));
    assert!(xml.contains("<title>KittenBot</title>"));
    assert!(!xml.contains("<item>"));
}

#[tokio::test]
async fn test_generate_atom_minified() {
    let store = Arc::new(dated_store(3));
    let generator = generator_with(
        &store,
        FeedOptions {
            format: FeedFormat::Atom,
            minify: true,
            ..options()
        },
    );

    let xml = String::from_utf8(generator.generate(&CancelToken::new()).await.unwrap()).unwrap();
    assert!(xml.contains("<feed"));
    assert_eq!(xml.matches("<entry>").count(), 3);
    assert!(!xml.contains('\n'));
}

#[tokio::test]
async fn test_minified_rss_keeps_multiline_prompt() {
    let store = Arc::new(MemoryStore::new().with_object(
        "20240101.png",
        at(100),
        [("prompt", "a kitten\n    in a hat"), ("model", "m1"), ("seed", "1")],
    ));
    let generator = generator_with(
        &store,
        FeedOptions {
            minify: true,
            ..options()
        },
    );

    let bytes = generator.generate(&CancelToken::new()).await.unwrap();
    let channel = ::rss::Channel::read_from(bytes.as_slice()).unwrap();

    assert_eq!(channel.items().len(), 1);
    assert_eq!(channel.items()[0].title(), Some("a kitten\n    in a hat:m1:1"));
}

#[tokio::test]
async fn test_pagination_collects_every_page() {
    let store = Arc::new(dated_store(10));
    let generator = generator_with(
        &store,
        FeedOptions {
            page_size: 3,
            ..options()
        },
    );

    let feed = generator.assemble(&CancelToken::new()).await.unwrap();

    assert_eq!(feed.items.len(), 10);
    assert_eq!(store.list_calls(), 4);
    assert_sorted(&feed);
}

#[tokio::test]
async fn test_lookback_window_bounds_listing() {
    // start-after cursor for NOW is 20240131.png
    let store = Arc::new(
        MemoryStore::new()
            .with_object("20231225.png", at(1), [])
            .with_object("20240131.png", at(2), [])
            .with_object("20240201.png", at(3), [])
            .with_object("20240229.png", at(4), []),
    );
    let generator = generator_with(&store, FeedOptions::default());

    let feed = generator.assemble(&CancelToken::new()).await.unwrap();

    let links: Vec<_> = feed.items.iter().map(FeedItem::link).collect();
    assert_eq!(
        links,
        [
            "https://kittenbot.io/20240201.png",
            "https://kittenbot.io/20240229.png"
        ]
    );
}

#[tokio::test]
async fn test_metadata_failure_fails_invocation() {
    let store = Arc::new(dated_store(8).fail_metadata("20000003.png"));
    let generator = generator_with(&store, options());

    let err = generator.assemble(&CancelToken::new()).await.unwrap_err();

    match err {
        FeedError::Metadata { key, source } => {
            assert_eq!(key, "20000003.png");
            assert!(matches!(source, StoreError::Request(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_object_is_an_error() {
    // listed but deleted before its lookup: surfaces, never silently dropped
    let store = Arc::new(MemoryStore::new().with_object("20240101.png", at(1), []));
    let generator = FeedGenerator::new(
        Arc::new(ListsGhost(Arc::clone(&store))),
        Arc::new(FixedClock(at(NOW))),
        Logger::discard(),
        options(),
    );

    let err = generator.assemble(&CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, FeedError::Metadata { key, .. } if key == "20240102.png"));
}

#[tokio::test]
async fn test_listing_failure_fails_invocation() {
    let store = Arc::new(dated_store(6).fail_listing_at(1));
    let generator = generator_with(
        &store,
        FeedOptions {
            page_size: 2,
            ..options()
        },
    );

    let err = generator.assemble(&CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, FeedError::Listing(StoreError::Request(_))));
    assert_eq!(store.list_calls(), 2);
}

#[tokio::test]
async fn test_failure_cancels_slow_siblings() {
    let store = Arc::new(
        dated_store(20)
            .with_latency(Duration::from_secs(30))
            .fail_metadata("20000010.png"),
    );
    let generator = generator_with(&store, options());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        generator.assemble(&CancelToken::new()),
    )
    .await
    .expect("failure should cancel the slow lookups");

    assert!(matches!(result, Err(FeedError::Metadata { key, .. }) if key == "20000010.png"));
    // only the failing lookup ran to completion
    assert_eq!(store.heads_completed(), 1);
}

#[tokio::test]
async fn test_caller_cancellation() {
    let store = Arc::new(dated_store(20).with_latency(Duration::from_secs(30)));
    let generator = generator_with(&store, options());
    let token = CancelToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), generator.generate(&token))
        .await
        .expect("cancellation should end the invocation");

    assert!(matches!(result, Err(FeedError::Cancelled)));
    assert_eq!(store.heads_completed(), 0);
}

#[tokio::test]
async fn test_already_cancelled_token() {
    let store = Arc::new(dated_store(3));
    let generator = generator_with(&store, options());
    let token = CancelToken::new();
    token.cancel();

    let result = generator.assemble(&token).await;
    assert!(matches!(result, Err(FeedError::Cancelled)));
    assert_eq!(store.head_calls(), 0);
}

#[tokio::test]
async fn test_invocations_are_independent() {
    let store = Arc::new(dated_store(4).with_jitter(Duration::from_millis(5)));
    let generator = generator_with(&store, options());
    let token = CancelToken::new();

    let (first, second) = tokio::join!(generator.assemble(&token), generator.assemble(&token));

    assert_eq!(first.unwrap().items.len(), 4);
    assert_eq!(second.unwrap().items.len(), 4);
}

#[tokio::test]
async fn test_logs_summary_line() {
    let captured = Captured::default();
    let store = Arc::new(dated_store(2));
    let generator = FeedGenerator::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::new(FixedClock(at(NOW))),
        Logger::to_writer(captured.clone(), false),
        options(),
    );

    generator.generate(&CancelToken::new()).await.unwrap();

    let text = captured.text();
    assert!(text.starts_with("[feed] 2 items, "));
    assert!(!text.contains("[stage]"));
}

#[tokio::test]
async fn test_verbose_logs_skips_and_stages() {
    let captured = Captured::default();
    let store = Arc::new(dated_store(1).with_object("latest.png", at(1), []));
    let generator = FeedGenerator::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::new(FixedClock(at(NOW))),
        Logger::to_writer(captured.clone(), true),
        options(),
    );

    generator.generate(&CancelToken::new()).await.unwrap();

    let text = captured.text();
    assert!(text.contains("[filter] skipped latest.png"));
    assert!(text.contains("[stage] draining"));
    assert!(text.contains("[stage] done"));
}

#[tokio::test]
async fn test_fetching_stage_starts_before_listing_ends() {
    let captured = Captured::default();
    let store = Arc::new(dated_store(4));
    let generator = FeedGenerator::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::new(FixedClock(at(NOW))),
        Logger::to_writer(captured.clone(), true),
        FeedOptions {
            page_size: 2,
            ..options()
        },
    );

    generator.assemble(&CancelToken::new()).await.unwrap();

    let text = captured.text();
    let fetching = text.find("[stage] fetching").unwrap();
    let second_page = text.find("[list] page 2 ").unwrap();
    assert!(fetching < second_page);
    assert_eq!(text.matches("[stage] fetching").count(), 1);
}

#[tokio::test]
async fn test_no_fetching_stage_without_keys() {
    let captured = Captured::default();
    let store = Arc::new(MemoryStore::new());
    let generator = FeedGenerator::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::new(FixedClock(at(NOW))),
        Logger::to_writer(captured.clone(), true),
        options(),
    );

    generator.assemble(&CancelToken::new()).await.unwrap();

    let text = captured.text();
    assert!(text.contains("[stage] listing"));
    assert!(!text.contains("[stage] fetching"));
    assert!(text.contains("[stage] draining"));
}

// ============================================================================
// Stress
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stress_many_keys_tiny_channel() {
    let store = Arc::new(dated_store(500).with_jitter(Duration::from_millis(3)));
    let generator = generator_with(
        &store,
        FeedOptions {
            channel_capacity: 1,
            page_size: 64,
            ..options()
        },
    );

    let feed = generator.assemble(&CancelToken::new()).await.unwrap();

    assert_eq!(feed.items.len(), 500);
    assert_sorted(&feed);
    // updates run opposite to key order
    assert_eq!(feed.items[0].link(), "https://kittenbot.io/20000499.png");
    assert_eq!(feed.items[499].link(), "https://kittenbot.io/20000000.png");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stress_failure_mid_stream() {
    for round in 0..5 {
        let failing = format!("{:08}.png", 20_000_000 + 100 * round + 37);
        let store = Arc::new(
            dated_store(500)
                .with_jitter(Duration::from_millis(3))
                .fail_metadata(failing.clone()),
        );
        let generator = generator_with(
            &store,
            FeedOptions {
                channel_capacity: 1,
                page_size: 50,
                ..options()
            },
        );

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            generator.assemble(&CancelToken::new()),
        )
        .await
        .expect("assembly must not hang");

        assert!(matches!(result, Err(FeedError::Metadata { key, .. }) if key == failing));
    }
}

/// Lists one key more than the inner store holds.
struct ListsGhost(Arc<MemoryStore>);

#[async_trait::async_trait]
impl ObjectStore for ListsGhost {
    async fn list_page(
        &self,
        request: crate::store::ListRequest,
    ) -> Result<crate::store::ListPage, StoreError> {
        let mut page = self.0.list_page(request).await?;
        page.entries.push(crate::store::ListEntry {
            key: "20240102.png".into(),
            size: 0,
        });
        Ok(page)
    }

    async fn head_object(&self, key: &str) -> Result<crate::store::ObjectMetadata, StoreError> {
        self.0.head_object(key).await
    }
}
