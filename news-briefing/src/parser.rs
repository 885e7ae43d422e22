use crate::types::{BriefingError, CalendarTime, RawEntry, Result};
use tracing::debug;

/// Turns downloaded feed documents into [`RawEntry`] values.
pub struct FeedParser;

impl FeedParser {
    /// Parses an RSS or Atom document into raw entries, in document order.
    ///
    /// RSS 0.9x/1.0/2.0 channels are read first so the publication date reaches the
    /// normalizer as the feed wrote it (`pubDate`, or `dc:date` for RDF feeds). Anything
    /// else (Atom, JSON Feed) goes through feed-rs, whose pre-parsed timestamp becomes the
    /// structured date.
    pub fn parse_entries(content: &[u8]) -> Result<Vec<RawEntry>> {
        match rss::Channel::read_from(content) {
            Ok(channel) => {
                let entries: Vec<RawEntry> = channel.items().iter().map(Self::from_rss_item).collect();
                debug!("Parsed RSS channel with {} entries", entries.len());
                Ok(entries)
            }
            Err(rss_err) => {
                debug!("Not an RSS channel ({}), trying generic feed parser", rss_err);
                let feed = feed_rs::parser::parse(content)
                    .map_err(|e| BriefingError::Parse(format!("Failed to parse feed: {}", e)))?;
                let entries: Vec<RawEntry> = feed.entries.into_iter().map(Self::from_feed_entry).collect();
                debug!("Parsed feed with {} entries", entries.len());
                Ok(entries)
            }
        }
    }

    fn from_rss_item(item: &rss::Item) -> RawEntry {
        let published = item.pub_date().or_else(|| {
            item.dublin_core_ext()
                .and_then(|dc| dc.dates().first())
                .map(String::as_str)
        });

        RawEntry {
            title: item.title().map(str::to_string),
            link: item.link().map(str::to_string),
            published: published.map(str::to_string),
            published_parsed: None,
            summary: item.description().map(str::to_string),
            content: item.content().map(str::to_string).into_iter().collect(),
        }
    }

    fn from_feed_entry(entry: feed_rs::model::Entry) -> RawEntry {
        RawEntry {
            title: entry.title.map(|t| t.content),
            link: entry.links.first().map(|l| l.href.clone()),
            published: None,
            published_parsed: entry.published.or(entry.updated).map(CalendarTime::from),
            summary: entry.summary.map(|s| s.content),
            content: entry.content.and_then(|c| c.body).into_iter().collect(),
        }
    }
}
