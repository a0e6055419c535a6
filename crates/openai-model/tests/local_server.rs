use std::time::Duration;

use chat_relay_model::{
    ChatMessage, ChatRequest, CompletionRequest, ErrorKind, ModelProvider,
    ProviderError, SamplingParams,
};
use chat_relay_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves a single HTTP response and yields the raw request it received.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if is_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

fn is_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}

fn provider(base_url: &str) -> OpenAIProvider {
    let config = OpenAIConfigBuilder::with_api_key("sk-test")
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .build();
    OpenAIProvider::new(config)
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        include_str!("../fixtures/chat_response.json"),
    )
    .await;

    let req = ChatRequest {
        messages: vec![ChatMessage::user("When was Rust 1.0 released?")],
        sampling: SamplingParams::default(),
    };
    let text = provider(&base_url).send_chat(&req).await.unwrap();
    assert_eq!(text, "\n\nRust 1.0 was released on May 15, 2015.  ");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/chat/completions "));
    assert!(request.contains("Bearer sk-test"));
    assert!(request.contains("\"content\":\"When was Rust 1.0 released?\""));
    assert!(request.contains("\"max_tokens\":500"));
}

#[tokio::test]
async fn test_completion_round_trip() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json; charset=utf-8",
        include_str!("../fixtures/completion_response.json"),
    )
    .await;

    let req = CompletionRequest {
        prompt: "Query: rust".to_owned(),
        sampling: SamplingParams::default(),
    };
    let text = provider(&base_url).send_completion(&req).await.unwrap();
    assert_eq!(
        text,
        "\n\nThe tallest mountain on Earth is Mount Everest [1]."
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/completions "));
    assert!(request.contains("\"prompt\":\"Query: rust\""));
}

#[tokio::test]
async fn test_rate_limited_response() {
    let (base_url, server) = serve_once(
        "429 Too Many Requests",
        "application/json",
        include_str!("../fixtures/rate_limit_error.json"),
    )
    .await;

    let req = ChatRequest {
        messages: vec![ChatMessage::user("Hi")],
        sampling: SamplingParams::default(),
    };
    let err = provider(&base_url).send_chat(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    assert!(err.message().starts_with("Rate limit reached"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_non_json_response() {
    let (base_url, server) =
        serve_once("200 OK", "text/html", "<html>maintenance</html>").await;

    let req = ChatRequest {
        messages: vec![ChatMessage::user("Hi")],
        sampling: SamplingParams::default(),
    };
    let err = provider(&base_url).send_chat(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(err.message().starts_with("Unexpected content type"));
    server.await.unwrap();
}
