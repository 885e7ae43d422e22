use crate::types::Article;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Recency bucket an article falls into relative to the run instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionTier {
    /// `[0h, 24h)`; future-dated entries land here too.
    Fresh,
    /// `[24h, 48h)`
    Recent,
    /// `[48h, 72h)`
    Older,
}

impl SelectionTier {
    pub fn of(published: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let age = now - published;
        if age < Duration::hours(24) {
            Some(SelectionTier::Fresh)
        } else if age < Duration::hours(48) {
            Some(SelectionTier::Recent)
        } else if age < Duration::hours(72) {
            Some(SelectionTier::Older)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Soft floor: older tiers are drawn on only until this many are selected.
    pub min_articles: usize,
    /// Hard cap on the digest size.
    pub max_articles: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_articles: 5,
            max_articles: 10,
        }
    }
}

/// Picks the articles to summarize, most recent first.
///
/// Everything from the last 24 hours is taken; the 24-48h and then the 48-72h buckets are
/// only drawn on to reach `min_articles`. The result never exceeds `max_articles`.
pub fn select_articles(
    mut articles: Vec<Article>,
    now: DateTime<Utc>,
    policy: &SelectionPolicy,
) -> Vec<Article> {
    articles.sort_by(|a, b| b.published.cmp(&a.published));

    let mut selected = Vec::new();
    let mut recent = Vec::new();
    let mut older = Vec::new();

    for article in articles {
        match SelectionTier::of(article.published, now) {
            Some(SelectionTier::Fresh) => selected.push(article),
            Some(SelectionTier::Recent) => recent.push(article),
            Some(SelectionTier::Older) => older.push(article),
            None => debug!("Outside selection window: {}", article.link),
        }
    }

    let fresh_count = selected.len();
    for article in recent.into_iter().chain(older) {
        if selected.len() >= policy.min_articles || selected.len() >= policy.max_articles {
            break;
        }
        selected.push(article);
    }

    selected.truncate(policy.max_articles);
    debug!(
        fresh = fresh_count,
        selected = selected.len(),
        "Selected articles for digest"
    );
    selected
}
