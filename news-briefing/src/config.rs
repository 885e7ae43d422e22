use crate::selector::SelectionPolicy;
use crate::types::{BriefingError, FeedSourceSpec, FetchConfig, Result};
use chrono::{DateTime, Duration, Utc};
use email_delivery::MailConfig;

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 3;

/// The monitored feeds, in the order they are ingested. Earlier feeds win duplicate links.
pub fn default_feeds() -> Vec<FeedSourceSpec> {
    vec![
        FeedSourceSpec::new("사건/사고", "https://rss.app/feeds/5wPlBHdpqAJmIchh.xml"),
        FeedSourceSpec::new("노동정책", "https://rss.app/feeds/G6EBProFzjCISBt2.xml"),
        FeedSourceSpec::new("노동조합", "https://rss.app/feeds/c9pv5qpCmgYEROxT.xml"),
        FeedSourceSpec::new("노사관계", "https://rss.app/feeds/JaS17kFMTvYda6QG.xml"),
        FeedSourceSpec::new("노동법", "https://rss.app/feeds/YuTCnwc6CzBa5CIR.xml"),
        FeedSourceSpec::new("한겨레 노동뉴스", "https://rss.app/feeds/teZ7fkbACRalryLf.xml"),
    ]
}

#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Everything read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feeds: Vec<FeedSourceSpec>,
    pub fetch: FetchConfig,
    /// `None` when the mock adapter is in use.
    pub llm: Option<LlmConfig>,
    /// `None` when email delivery is disabled.
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn from_env(require_llm: bool, require_mail: bool) -> Result<Self> {
        Self::from_lookup(require_llm, require_mail, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(require_llm: bool, require_mail: bool, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| BriefingError::MissingConfig(key.to_string()));

        let llm = if require_llm {
            Some(LlmConfig {
                api_key: require("ANTHROPIC_API_KEY")?,
                model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("ANTHROPIC_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            })
        } else {
            None
        };

        let mail = if require_mail {
            let smtp_port = match get("SMTP_PORT") {
                Some(raw) => raw.parse::<u16>().map_err(|_| BriefingError::InvalidConfig {
                    key: "SMTP_PORT".to_string(),
                    value: raw.clone(),
                })?,
                None => DEFAULT_SMTP_PORT,
            };
            let recipients: Vec<String> = require("EMAIL_RECIPIENT")?
                .split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            if recipients.is_empty() {
                return Err(BriefingError::MissingConfig("EMAIL_RECIPIENT".to_string()));
            }

            Some(MailConfig {
                smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port,
                sender: require("EMAIL_SENDER")?,
                password: require("EMAIL_PASSWORD")?,
                recipients,
            })
        } else {
            None
        };

        Ok(Self {
            feeds: default_feeds(),
            fetch: FetchConfig::default(),
            llm,
            mail,
        })
    }
}

/// Per-run values every stage reads: the single `now` snapshot, the ingest window and the
/// selection policy.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub now: DateTime<Utc>,
    pub lookback: Duration,
    pub policy: SelectionPolicy,
}

impl RunContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            lookback: Duration::days(DEFAULT_LOOKBACK_DAYS),
            policy: SelectionPolicy::default(),
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback = Duration::days(days);
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Entries published before this instant are dropped at ingestion.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.now - self.lookback
    }
}
