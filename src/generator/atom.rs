//! Atom 1.0 rendering.

use atom_syndication::{
    Entry, EntryBuilder, FeedBuilder, FixedDateTime, GeneratorBuilder, Link, LinkBuilder, Text,
};

use super::GENERATOR;
use crate::feed::{Feed, FeedError, FeedItem};
use crate::utils::date::DateTimeUtc;

/// Serialize `feed` as an Atom 1.0 document.
pub fn render_atom(feed: &Feed) -> Result<String, FeedError> {
    let base_url = feed.link.trim_end_matches('/');

    let entries = feed
        .items
        .iter()
        .map(to_atom_entry)
        .collect::<Result<Vec<Entry>, _>>()?;

    let alternate: Link = LinkBuilder::default()
        .href(base_url.to_string())
        .rel("alternate".to_string())
        .build();

    let document = FeedBuilder::default()
        .title(Text::plain(feed.title.clone()))
        .id(base_url)
        .updated(fixed_date_time(feed.updated)?)
        .links(vec![alternate])
        .subtitle(Some(Text::plain(feed.description.clone())))
        .generator(Some(GeneratorBuilder::default().value(GENERATOR).build()))
        .entries(entries)
        .build();

    Ok(document.to_string())
}

fn to_atom_entry(item: &FeedItem) -> Result<Entry, FeedError> {
    let link: Link = LinkBuilder::default()
        .href(item.link())
        .rel("alternate".to_string())
        .build();

    Ok(EntryBuilder::default()
        .title(Text::plain(item.title().to_string()))
        .id(item.link())
        .updated(fixed_date_time(item.updated())?)
        .links(vec![link])
        .build())
}

fn fixed_date_time(time: std::time::SystemTime) -> Result<FixedDateTime, FeedError> {
    DateTimeUtc::from_system_time(time)
        .to_rfc3339()
        .parse()
        .map_err(|e| FeedError::Serialization(format!("invalid timestamp: {e}")))
}
