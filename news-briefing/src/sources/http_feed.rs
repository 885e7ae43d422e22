use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::FeedSource;
use crate::types::{FetchConfig, RawEntry, Result};
use async_trait::async_trait;
use tracing::info;

/// Feed source that downloads documents over HTTP and parses them as RSS/Atom.
pub struct HttpFeedSource {
    fetcher: Fetcher,
}

impl HttpFeedSource {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn source_name(&self) -> String {
        format!("HTTP feed source ({})", self.fetcher.config().user_agent)
    }

    async fn fetch_entries(&self, url: &str) -> Result<Vec<RawEntry>> {
        info!("Pulling feed: {}", url);
        let body = self.fetcher.fetch_feed(url).await?;
        FeedParser::parse_entries(&body)
    }
}
