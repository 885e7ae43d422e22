use crate::llm_adapter::{LlmAdapter, SamplingConfig, CONTENT_MARKER};
use tracing::{debug, warn};

/// Bodies shorter than this (in characters) are not sent for summarization.
pub const MIN_CONTENT_CHARS: usize = 50;
/// Bodies are cut to this many characters before prompting.
pub const MAX_CONTENT_CHARS: usize = 6000;

pub const SYSTEM_PROMPT: &str =
    "당신은 노동 관련 뉴스를 명확하고 간결히 요약하여 인사노무 담당자에게 제공하는 전문가입니다.";

pub const INSUFFICIENT_CONTENT_FALLBACK: &str =
    "[핵심 요약]\n- 기사 본문이 짧아 요약을 생략했습니다.\n\n[실무 시사점]\n- 원문 기사를 직접 확인해 주세요.";

pub const SUMMARY_FAILED_FALLBACK: &str =
    "[핵심 요약]\n- 요약 생성에 실패했습니다.\n\n[실무 시사점]\n- 원문 기사를 직접 확인해 주세요.";

/// Fixed two-section request template with the article text after [`CONTENT_MARKER`].
pub fn build_prompt(content: &str) -> String {
    format!(
        "다음 뉴스를 읽고, 양식에 맞춰 작성해 주세요. 서론이나 결론 문장 없이 두 항목만 작성하세요.\n\n\
         [핵심 요약] (2문장 내외):\n-\n\n\
         [실무 시사점] (2-3가지):\n-\n\n\
         {}\n{}\n",
        CONTENT_MARKER, content
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turns one article body into the two-section summary text. Never fails.
pub struct Summarizer {
    adapter: Box<dyn LlmAdapter>,
    sampling: SamplingConfig,
}

impl Summarizer {
    pub fn new(adapter: Box<dyn LlmAdapter>) -> Self {
        Self {
            adapter,
            sampling: SamplingConfig::default(),
        }
    }

    pub fn adapter_name(&self) -> String {
        self.adapter.adapter_name()
    }

    pub async fn summarize(&self, content: &str) -> String {
        let content = content.trim();
        let length = content.chars().count();
        if length < MIN_CONTENT_CHARS {
            debug!(chars = length, "Content too short, skipping summarization");
            return INSUFFICIENT_CONTENT_FALLBACK.to_string();
        }

        let capped = truncate_chars(content, MAX_CONTENT_CHARS);
        if capped.len() < content.len() {
            debug!(chars = length, "Content capped at {} characters", MAX_CONTENT_CHARS);
        }

        let prompt = build_prompt(capped);
        match self.adapter.complete(SYSTEM_PROMPT, &prompt, &self.sampling).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(adapter = %self.adapter.adapter_name(), "Summarization returned empty text");
                SUMMARY_FAILED_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(adapter = %self.adapter.adapter_name(), error = %e, "Summarization failed");
                SUMMARY_FAILED_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_adapter::{LlmError, MockLlmAdapter};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct RecordingAdapter {
        prompts: Arc<Mutex<Vec<String>>>,
        reply: String,
    }

    #[async_trait]
    impl LlmAdapter for RecordingAdapter {
        fn adapter_name(&self) -> String {
            "recording".to_string()
        }

        async fn complete(&self, _system: &str, prompt: &str, _sampling: &SamplingConfig) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn recording(reply: &str) -> (Summarizer, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let adapter = RecordingAdapter {
            prompts: prompts.clone(),
            reply: reply.to_string(),
        };
        (Summarizer::new(Box::new(adapter)), prompts)
    }

    fn is_two_section(text: &str) -> bool {
        match (text.find("[핵심 요약]"), text.find("[실무 시사점]")) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("가나다라", 2), "가나");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn short_content_skips_the_service() {
        let (summarizer, prompts) = recording("unused");
        assert_eq!(summarizer.summarize("짧은 기사").await, INSUFFICIENT_CONTENT_FALLBACK);
        assert_eq!(summarizer.summarize("").await, INSUFFICIENT_CONTENT_FALLBACK);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn long_content_is_capped_in_prompt() {
        let (summarizer, prompts) = recording("  [핵심 요약]\n- ok\n\n[실무 시사점]\n- ok  ");
        let body = "뷁".repeat(MAX_CONTENT_CHARS + 500);

        let summary = summarizer.summarize(&body).await;
        assert_eq!(summary, "[핵심 요약]\n- ok\n\n[실무 시사점]\n- ok");

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].matches('뷁').count(), MAX_CONTENT_CHARS);
        assert!(prompts[0].contains(CONTENT_MARKER));
    }

    #[tokio::test]
    async fn service_failure_becomes_fallback() {
        let summarizer = Summarizer::new(Box::new(MockLlmAdapter::new("down").failing()));
        let body = "근로기준법 개정으로 연장근로 한도가 조정되었으며 사업장은 시행일 이전까지 관련 규정을 정비해야 한다.";
        assert_eq!(summarizer.summarize(body).await, SUMMARY_FAILED_FALLBACK);
    }

    #[tokio::test]
    async fn blank_reply_becomes_fallback() {
        let (summarizer, _) = recording("   ");
        let body = "x".repeat(MIN_CONTENT_CHARS);
        assert_eq!(summarizer.summarize(&body).await, SUMMARY_FAILED_FALLBACK);
    }

    #[tokio::test]
    async fn every_input_yields_two_sections() {
        let summarizer = Summarizer::new(Box::new(MockLlmAdapter::new("test")));
        let inputs = [
            String::new(),
            "short".to_string(),
            "고용노동부는 올해 하반기 임금체불 집중 단속을 실시한다고 밝혔다. 대상은 건설업과 제조업 사업장이다.".to_string(),
            "장문 ".repeat(5000),
        ];
        for input in &inputs {
            let summary = summarizer.summarize(input).await;
            assert!(is_two_section(&summary), "bad shape for input of {} chars", input.chars().count());
        }

        let failing = Summarizer::new(Box::new(MockLlmAdapter::new("down").failing()));
        for input in &inputs {
            assert!(is_two_section(&failing.summarize(input).await));
        }
    }
}
