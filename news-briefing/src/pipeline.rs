use crate::aggregator::RssAggregator;
use crate::config::RunContext;
use crate::digest::{compose_digest, SummarizedArticle};
use crate::selector::select_articles;
use crate::summarizer::Summarizer;
use crate::types::DigestOutput;
use tracing::info;

/// One briefing run: aggregate, select, summarize, render.
pub struct BriefingPipeline {
    aggregator: RssAggregator,
    summarizer: Summarizer,
}

impl BriefingPipeline {
    pub fn new(aggregator: RssAggregator, summarizer: Summarizer) -> Self {
        Self {
            aggregator,
            summarizer,
        }
    }

    /// Always produces a digest; feed and summarization failures only shrink or
    /// placeholder its content.
    pub async fn run(&self, ctx: &RunContext) -> DigestOutput {
        info!(
            now = %ctx.now,
            feeds = self.aggregator.feeds().len(),
            adapter = %self.summarizer.adapter_name(),
            "Starting briefing run"
        );

        let articles = self.aggregator.collect(ctx).await;
        let available = articles.len();
        let selected = select_articles(articles, ctx.now, &ctx.policy);
        info!(available, selected = selected.len(), "Articles selected");

        let total = selected.len();
        let mut items = Vec::with_capacity(total);
        for (idx, article) in selected.into_iter().enumerate() {
            info!(index = idx + 1, total, title = %article.title, "Summarizing article");
            let summary = self.summarizer.summarize(&article.summary).await;
            items.push(SummarizedArticle { article, summary });
        }

        compose_digest(&items, ctx.now)
    }
}
