//! RSS 2.0 rendering.

use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder, validation::Validate};

use super::GENERATOR;
use crate::feed::{Feed, FeedError, FeedItem};
use crate::utils::date::DateTimeUtc;

/// Serialize `feed` as an RSS 2.0 document. The channel is validated first.
pub fn render_rss(feed: &Feed) -> Result<String, FeedError> {
    let channel = build_channel(feed);
    channel
        .validate()
        .map_err(|e| FeedError::Serialization(format!("RSS validation failed: {e}")))?;
    Ok(channel.to_string())
}

fn build_channel(feed: &Feed) -> Channel {
    let items: Vec<Item> = feed.items.iter().map(to_rss_item).collect();

    ChannelBuilder::default()
        .title(&feed.title)
        .link(&feed.link)
        .description(&feed.description)
        .last_build_date(DateTimeUtc::from_system_time(feed.updated).to_rfc2822())
        .generator(GENERATOR.to_string())
        .items(items)
        .build()
}

fn to_rss_item(item: &FeedItem) -> Item {
    let link = item.link().to_string();

    ItemBuilder::default()
        .title(item.title().to_string())
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .pub_date(DateTimeUtc::from_system_time(item.updated()).to_rfc2822())
        .build()
}
