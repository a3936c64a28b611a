//! Per-key metadata lookup.

use super::{FeedError, FeedItem};
use crate::store::ObjectStore;

/// Fetch the metadata of `key` and turn it into a feed item.
pub async fn fetch_item(
    store: &dyn ObjectStore,
    key: &str,
    base_link: &str,
) -> Result<FeedItem, FeedError> {
    let meta = store
        .head_object(key)
        .await
        .map_err(|source| FeedError::Metadata {
            key: key.to_string(),
            source,
        })?;
    Ok(FeedItem::from_metadata(key, &meta, base_link))
}
