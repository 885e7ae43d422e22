use crate::config::RunContext;
use crate::sanitize::{clean_title, sanitize_text};
use crate::timestamp::normalize_published;
use crate::traits::FeedSource;
use crate::types::{Article, FeedSourceSpec, RawEntry};
use tracing::{debug, info, warn};

/// Why an entry did not become an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("published before the lookback window")]
    Stale,
    #[error("empty title")]
    MissingTitle,
    #[error("empty link")]
    MissingLink,
    #[error("no summary or content text")]
    MissingSummary,
}

/// First non-empty sanitized text among the summary and the content blocks.
fn resolve_summary(entry: &RawEntry) -> String {
    entry
        .summary
        .iter()
        .chain(entry.content.iter())
        .map(|text| sanitize_text(text))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Builds an [`Article`] from one raw entry, or says why the entry is dropped.
///
/// The recency check runs first, against `ctx.window_start()`.
pub fn normalize_entry(
    entry: RawEntry,
    category: Option<&str>,
    ctx: &RunContext,
) -> Result<Article, DropReason> {
    let published = normalize_published(
        entry.published_parsed.as_ref(),
        entry.published.as_deref(),
        ctx.now,
    );
    if published < ctx.window_start() {
        return Err(DropReason::Stale);
    }

    let title = clean_title(entry.title.as_deref());
    if title.is_empty() {
        return Err(DropReason::MissingTitle);
    }

    let link = entry.link.as_deref().map(str::trim).unwrap_or_default().to_string();
    if link.is_empty() {
        return Err(DropReason::MissingLink);
    }

    let summary = resolve_summary(&entry);
    if summary.is_empty() {
        return Err(DropReason::MissingSummary);
    }

    Ok(Article {
        title,
        link,
        published,
        summary,
        category: category.map(str::to_string),
    })
}

/// Ingests one feed. Fetch or parse failures are logged and yield no articles.
pub async fn ingest_feed(
    source: &dyn FeedSource,
    feed: &FeedSourceSpec,
    ctx: &RunContext,
) -> Vec<Article> {
    let entries = match source.fetch_entries(&feed.url).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(category = %feed.category, url = %feed.url, error = %e, "Feed ingestion failed");
            return Vec::new();
        }
    };

    let total = entries.len();
    let articles: Vec<Article> = entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.link.clone().unwrap_or_default();
            match normalize_entry(entry, Some(&feed.category), ctx) {
                Ok(article) => Some(article),
                Err(reason) => {
                    debug!(category = %feed.category, link = %link, %reason, "Dropped entry");
                    None
                }
            }
        })
        .collect();

    info!(
        category = %feed.category,
        entries = total,
        kept = articles.len(),
        "Ingested feed"
    );
    articles
}
