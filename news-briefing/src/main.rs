use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use email_delivery::EmailDelivery;
use news_briefing::logging::init_logging;
use news_briefing::{
    AnthropicAdapter, AppConfig, BriefingPipeline, HttpFeedSource, LlmAdapter, MockLlmAdapter,
    RssAggregator, RunContext, SelectionPolicy, Summarizer,
};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Builds the daily labor-law news briefing and prints it to stdout.
#[derive(Parser, Debug)]
#[command(name = "news-briefing", version)]
struct Args {
    /// Skip email delivery; the digest is only printed.
    #[arg(long)]
    no_email: bool,

    /// Summarize with the offline mock adapter instead of the Anthropic API.
    #[arg(long)]
    mock_llm: bool,

    /// Drop entries published more than this many days ago.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(i64).range(1..=30))]
    lookback_days: i64,

    #[arg(long, default_value_t = 10)]
    max_articles: usize,

    #[arg(long, default_value_t = 5)]
    min_articles: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig::from_env(!args.mock_llm, !args.no_email)
        .context("Failed to load configuration")?;

    let adapter: Box<dyn LlmAdapter> = match &config.llm {
        Some(llm) => Box::new(
            AnthropicAdapter::new(llm.clone()).context("Failed to create Anthropic client")?,
        ),
        None => Box::new(MockLlmAdapter::new("offline")),
    };
    let source = HttpFeedSource::new(config.fetch.clone()).context("Failed to create HTTP client")?;
    let delivery = match &config.mail {
        Some(mail) => Some(EmailDelivery::smtp(mail).context("Failed to configure SMTP transport")?),
        None => None,
    };

    let ctx = RunContext::new(Utc::now())
        .with_lookback_days(args.lookback_days)
        .with_policy(SelectionPolicy {
            min_articles: args.min_articles,
            max_articles: args.max_articles,
        });

    let pipeline = BriefingPipeline::new(
        RssAggregator::new(Box::new(source), config.feeds.clone()),
        Summarizer::new(adapter),
    );
    let digest = pipeline.run(&ctx).await;
    println!("{}", digest.text);

    match delivery {
        Some(delivery) => {
            if let Err(e) = delivery.deliver(&digest).await {
                warn!(error = %e, "Digest was printed but not emailed");
            }
        }
        None => info!("Email delivery disabled"),
    }
    Ok(())
}
