pub mod aggregator;
pub mod config;
pub mod digest;
pub mod fetcher;
pub mod ingest;
pub mod llm_adapter;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod sanitize;
pub mod selector;
pub mod sources;
pub mod summarizer;
pub mod timestamp;
pub mod traits;
pub mod types;

pub use aggregator::{dedup_by_link, RssAggregator};
pub use config::{AppConfig, LlmConfig, RunContext};
pub use digest::{compose_digest, render_digest, SummarizedArticle};
pub use fetcher::Fetcher;
pub use ingest::{ingest_feed, normalize_entry, DropReason};
pub use llm_adapter::{AnthropicAdapter, LlmAdapter, LlmError, MockLlmAdapter, SamplingConfig};
pub use parser::FeedParser;
pub use pipeline::BriefingPipeline;
pub use selector::{select_articles, SelectionPolicy, SelectionTier};
pub use sources::HttpFeedSource;
pub use summarizer::Summarizer;
pub use traits::FeedSource;
pub use types::*;
