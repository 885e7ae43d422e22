use crate::config::RunContext;
use crate::ingest::ingest_feed;
use crate::traits::FeedSource;
use crate::types::{Article, FeedSourceSpec};
use std::collections::HashSet;
use tracing::{debug, info};

/// Runs every configured feed through ingestion and merges the results.
pub struct RssAggregator {
    source: Box<dyn FeedSource>,
    feeds: Vec<FeedSourceSpec>,
}

impl RssAggregator {
    pub fn new(source: Box<dyn FeedSource>, feeds: Vec<FeedSourceSpec>) -> Self {
        Self { source, feeds }
    }

    pub fn feeds(&self) -> &[FeedSourceSpec] {
        &self.feeds
    }

    /// Feeds are visited one at a time in configuration order, so the first feed to
    /// carry a link keeps it.
    pub async fn collect(&self, ctx: &RunContext) -> Vec<Article> {
        let mut seen = HashSet::new();
        let mut articles = Vec::new();

        for feed in &self.feeds {
            let ingested = ingest_feed(self.source.as_ref(), feed, ctx).await;
            push_unseen(&mut seen, &mut articles, ingested);
        }

        info!(
            feeds = self.feeds.len(),
            articles = articles.len(),
            source = %self.source.source_name(),
            "Aggregated feeds"
        );
        articles
    }
}

fn push_unseen(seen: &mut HashSet<String>, out: &mut Vec<Article>, batch: Vec<Article>) {
    for article in batch {
        if seen.insert(article.link.clone()) {
            out.push(article);
        } else {
            debug!(link = %article.link, "Skipping duplicate link");
        }
    }
}

/// Keeps the first article for every link, preserving order.
pub fn dedup_by_link(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(articles.len());
    push_unseen(&mut seen, &mut out, articles);
    out
}
