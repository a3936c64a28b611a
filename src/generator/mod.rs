//! Syndication output for an assembled [`Feed`].
//!
//! - **RSS 2.0**: the default document (`feed.xml`)
//! - **Atom 1.0**: same items, Atom vocabulary
//!
//! Both renderers keep the item order they are given.

mod atom;
mod rss;

pub use self::atom::render_atom;
pub use self::rss::render_rss;

use std::borrow::Cow;

use crate::config::FeedFormat;
use crate::feed::{Feed, FeedError};

/// Generator name advertised in the documents.
pub const GENERATOR: &str = "kittenfeed";

/// Render `feed` in the requested format, optionally minified.
pub fn render(feed: &Feed, format: FeedFormat, minify: bool) -> Result<Vec<u8>, FeedError> {
    let xml = match format {
        FeedFormat::Rss => render_rss(feed)?,
        FeedFormat::Atom => render_atom(feed)?,
    };
    Ok(minify_xml(xml.as_bytes(), minify).into_owned())
}

/// Minify XML content if enabled.
///
/// Only whitespace runs sitting between two tags (or at either end of the
/// document) are dropped. Text content keeps its whitespace verbatim, since
/// writers escape `<` and `>` inside text.
pub fn minify_xml(content: &[u8], enabled: bool) -> Cow<'_, [u8]> {
    if !enabled {
        return Cow::Borrowed(content);
    }
    let Ok(xml) = std::str::from_utf8(content) else {
        return Cow::Borrowed(content);
    };

    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find(|c: char| c.is_ascii_whitespace()) {
        let (text, tail) = rest.split_at(start);
        out.push_str(text);

        let end = tail
            .find(|c: char| !c.is_ascii_whitespace())
            .unwrap_or(tail.len());
        let (space, after) = tail.split_at(end);
        let after_tag = out.is_empty() || out.ends_with('>');
        let before_tag = after.is_empty() || after.starts_with('<');
        if !(after_tag && before_tag) {
            out.push_str(space);
        }
        rest = after;
    }
    out.push_str(rest);
    Cow::Owned(out.into_bytes())
}
