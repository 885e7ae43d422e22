use crate::types::{RawEntry, Result};
use async_trait::async_trait;

/// Something that can turn a feed URL into raw entries (HTTP in production, canned data in tests).
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable name for logs.
    fn source_name(&self) -> String;

    /// Fetch and parse one feed. Entries come back in document order.
    async fn fetch_entries(&self, url: &str) -> Result<Vec<RawEntry>>;
}
