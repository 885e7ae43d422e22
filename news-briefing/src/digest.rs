use crate::types::{Article, DigestOutput};
use chrono::{DateTime, FixedOffset, Utc};

pub const NO_ARTICLES_MESSAGE: &str = "현재 최신 기사가 없습니다.";

pub const FOOTER: &str = "📌 주요 실무 이슈만 엄선했습니다. 노무법인 위너스가 전하는 노동법 최신 소식! 업무에 도움이 되셨다면 주변에도 공유해 주세요. 👍";

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// An article paired with its two-section summary text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizedArticle {
    pub article: Article,
    pub summary: String,
}

fn kst() -> Option<FixedOffset> {
    FixedOffset::east_opt(KST_OFFSET_SECS)
}

/// Publication time in Korean local time, or UTC when the offset is unavailable.
pub fn format_published(published: DateTime<Utc>) -> String {
    match kst() {
        Some(offset) => format!("{} KST", published.with_timezone(&offset).format("%Y-%m-%d %H:%M")),
        None => format!("{} UTC", published.format("%Y-%m-%d %H:%M")),
    }
}

fn format_run_date(now: DateTime<Utc>) -> String {
    match kst() {
        Some(offset) => now.with_timezone(&offset).format("%Y년 %m월 %d일").to_string(),
        None => now.format("%Y년 %m월 %d일").to_string(),
    }
}

/// First line of the digest, dated by the KST calendar day of `now`.
pub fn header_line(now: DateTime<Utc>) -> String {
    format!("📌 [노무법인 위너스의 오늘의 노동법 브리핑] ({} 기준)", format_run_date(now))
}

/// Email subject for the run.
pub fn subject_line(now: DateTime<Utc>) -> String {
    format!("[노동법 브리핑] {}", format_run_date(now))
}

fn render_block(item: &SummarizedArticle) -> String {
    format!(
        "🔹 {} (발행일: {})\n{}\n- 바로가기: {}",
        item.article.title,
        format_published(item.article.published),
        item.summary,
        item.article.link
    )
}

/// Renders the plain-text digest. Output depends only on the arguments.
pub fn render_digest(items: &[SummarizedArticle], now: DateTime<Utc>) -> String {
    let mut sections = vec![header_line(now)];
    if items.is_empty() {
        sections.push(NO_ARTICLES_MESSAGE.to_string());
    } else {
        sections.extend(items.iter().map(render_block));
    }
    sections.push(FOOTER.to_string());
    sections.join("\n\n")
}

/// Digest text plus subject, ready for printing and mailing.
pub fn compose_digest(items: &[SummarizedArticle], now: DateTime<Utc>) -> DigestOutput {
    DigestOutput {
        subject: subject_line(now),
        text: render_digest(items, now),
    }
}
