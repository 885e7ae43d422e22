use news_briefing::config::LlmConfig;
use news_briefing::summarizer::SUMMARY_FAILED_FALLBACK;
use news_briefing::{
    AnthropicAdapter, BriefingError, FeedSource, FetchConfig, HttpFeedSource, LlmAdapter,
    LlmError, SamplingConfig, Summarizer,
};
use serde_json::json;
use std::sync::Once;
use tracing::info;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: "News-Briefing-Test/1.0".to_string(),
        timeout_seconds: 5,
        max_retries: 2,
        retry_delay_ms: 10,
        ..FetchConfig::default()
    }
}

const RSS_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>노동법</title>
    <link>https://rss.app</link>
    <description>labor law</description>
    <item>
      <title>[.txt] 대법원, 통상임금 판단 기준 변경</title>
      <link>https://news.example.com/wage</link>
      <pubDate>Tue, 04 Jun 2024 08:00:00 GMT</pubDate>
      <description>&lt;p&gt;대법원 전원합의체가 통상임금 판단 기준을 변경했다.&lt;/p&gt;</description>
    </item>
  </channel>
</rss>"#;

const ATOM_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom labor feed</title>
  <id>urn:labor</id>
  <updated>2024-06-04T00:00:00Z</updated>
  <entry>
    <title>Union bargaining resumes</title>
    <id>urn:labor:1</id>
    <link href="https://news.example.com/union"/>
    <published>2024-06-03T21:15:00Z</published>
    <summary>Talks resume next week.</summary>
  </entry>
</feed>"#;

fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        api_key: "test-key".to_string(),
        model: "claude-3-haiku-20240307".to_string(),
        base_url: format!("{}/v1", server.uri()),
    }
}

#[tokio::test]
async fn http_source_reads_rss_feed() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/labor.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS_BODY))
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fast_fetch_config()).unwrap();
    let entries = source
        .fetch_entries(&format!("{}/feeds/labor.xml", server.uri()))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].link.as_deref(), Some("https://news.example.com/wage"));
    assert_eq!(entries[0].published.as_deref(), Some("Tue, 04 Jun 2024 08:00:00 GMT"));
    info!("RSS entry fetched: {:?}", entries[0].title);
}

#[tokio::test]
async fn http_source_reads_atom_feed() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/atom.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ATOM_BODY))
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fast_fetch_config()).unwrap();
    let entries = source
        .fetch_entries(&format!("{}/atom.xml", server.uri()))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title.as_deref(), Some("Union bargaining resumes"));
    assert!(entries[0].published_parsed.is_some());
}

#[tokio::test]
async fn server_errors_are_retried() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.xml"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fast_fetch_config()).unwrap();
    let entries = source
        .fetch_entries(&format!("{}/flaky.xml", server.uri()))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fast_fetch_config()).unwrap();
    let result = source
        .fetch_entries(&format!("{}/missing.xml", server.uri()))
        .await;
    assert!(matches!(result, Err(BriefingError::HttpStatus { status: 404, .. })));
}

#[tokio::test]
async fn retries_are_bounded() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fast_fetch_config()).unwrap();
    let result = source
        .fetch_entries(&format!("{}/down.xml", server.uri()))
        .await;
    assert!(matches!(result, Err(BriefingError::HttpStatus { status: 500, .. })));
}

#[tokio::test]
async fn non_feed_body_is_a_parse_error() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>not a feed</body></html>"))
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fast_fetch_config()).unwrap();
    let result = source
        .fetch_entries(&format!("{}/page.html", server.uri()))
        .await;
    assert!(matches!(result, Err(BriefingError::Parse(_))));
}

#[tokio::test]
async fn anthropic_adapter_sends_messages_request() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-haiku-20240307",
            "max_tokens": 400,
            "system": "system prompt",
            "messages": [{ "role": "user", "content": "prompt text" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": " [핵심 요약]\n- 요약\n\n[실무 시사점]\n- 점검 " }],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = AnthropicAdapter::new(llm_config(&server)).unwrap();
    let text = adapter
        .complete("system prompt", "prompt text", &SamplingConfig::default())
        .await
        .unwrap();
    assert_eq!(text, "[핵심 요약]\n- 요약\n\n[실무 시사점]\n- 점검");
}

#[tokio::test]
async fn anthropic_error_body_is_surfaced() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": { "type": "authentication_error", "message": "invalid x-api-key" }
        })))
        .mount(&server)
        .await;

    let adapter = AnthropicAdapter::new(llm_config(&server)).unwrap();
    let result = adapter
        .complete("system", "prompt", &SamplingConfig::default())
        .await;
    match result {
        Err(LlmError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid x-api-key");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn anthropic_empty_content_is_an_error() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let adapter = AnthropicAdapter::new(llm_config(&server)).unwrap();
    let result = adapter
        .complete("system", "prompt", &SamplingConfig::default())
        .await;
    assert!(matches!(result, Err(LlmError::Empty)));
}

#[tokio::test]
async fn summarizer_falls_back_when_service_errors() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let summarizer = Summarizer::new(Box::new(AnthropicAdapter::new(llm_config(&server)).unwrap()));
    let body = "중앙노동위원회는 부당해고 구제신청 사건에서 사용자의 해고 절차가 근로기준법을 위반했다고 판정했다.";
    assert_eq!(summarizer.summarize(body).await, SUMMARY_FAILED_FALLBACK);
}
