use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use chat_api::{
    normalize_chat_url, ChatApiClient, ChatApiConfig, ChatApiError, ChatMessage, ChatRequest,
};
use serde_json::{json, Value};

#[test]
fn http_request_builds_completions_endpoint_and_headers() {
    let config = ChatApiConfig::new("sk-test")
        .with_base_url("https://api.example.com/v1")
        .with_user_agent("helm/0.1.0");
    let client = ChatApiClient::new(config).expect("client");
    let request = ChatRequest::new("model", vec![ChatMessage::user("payload")]);

    let http_request = client
        .build_request(&request)
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        http_request.url().as_str(),
        normalize_chat_url("https://api.example.com/v1")
    );
    assert_eq!(http_request.method(), "POST");
    let headers = http_request.headers();
    assert_eq!(headers["authorization"], "Bearer sk-test");
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["user-agent"], "helm/0.1.0");
}

#[test]
fn http_request_requires_api_key() {
    let client = ChatApiClient::new(ChatApiConfig::new("  ")).expect("client");
    let request = ChatRequest::new("model", Vec::new());
    let error = client.build_request(&request).expect_err("missing key");
    assert!(matches!(error, ChatApiError::MissingApiKey));
}

#[tokio::test]
async fn complete_decodes_successful_response() {
    let body = json!({
        "choices": [{"message": {"content": "hello"}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
    })
    .to_string();
    let server = serve_once("200 OK", body);

    let client = ChatApiClient::new(ChatApiConfig::new("sk-test").with_base_url(&server.base_url))
        .expect("client");
    let request = ChatRequest::new("m", vec![ChatMessage::user("hi")]).with_temperature(0.7);
    let response = client.complete(&request).await.expect("complete");

    assert_eq!(
        response.first_choice().and_then(|c| c.message.content.as_deref()),
        Some("hello")
    );
    assert_eq!(response.usage_or_default().total_tokens, 5);

    let received = server.join();
    assert!(received.request_line.starts_with("POST /v1/chat/completions "));
    assert_eq!(received.body["model"], "m");
    assert_eq!(received.body["messages"][0]["role"], "user");
}

#[tokio::test]
async fn complete_maps_error_status_to_message() {
    let server = serve_once(
        "401 Unauthorized",
        json!({"error": {"message": "bad key"}}).to_string(),
    );

    let client = ChatApiClient::new(ChatApiConfig::new("sk-test").with_base_url(&server.base_url))
        .expect("client");
    let request = ChatRequest::new("m", vec![ChatMessage::user("hi")]);
    let error = client.complete(&request).await.expect_err("status error");

    match error {
        ChatApiError::Status(status, message) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "bad key");
        }
        other => panic!("unexpected error: {other}"),
    }
    server.join();
}

#[tokio::test]
async fn complete_reports_malformed_body() {
    let server = serve_once("200 OK", "not json".to_string());

    let client = ChatApiClient::new(ChatApiConfig::new("sk-test").with_base_url(&server.base_url))
        .expect("client");
    let request = ChatRequest::new("m", Vec::new());
    let error = client.complete(&request).await.expect_err("decode error");
    assert!(matches!(error, ChatApiError::Serde(_)));
    server.join();
}

struct Received {
    request_line: String,
    body: Value,
}

struct OneShotServer {
    base_url: String,
    handle: thread::JoinHandle<Received>,
}

impl OneShotServer {
    fn join(self) -> Received {
        self.handle.join().expect("server thread")
    }
}

fn serve_once(status: &'static str, body: String) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header line");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("content length");
                }
            }
        }

        let mut raw_body = vec![0u8; content_length];
        reader.read_exact(&mut raw_body).expect("body");
        let received_body = serde_json::from_slice(&raw_body).unwrap_or(Value::Null);

        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body_text}",
            body.len(),
            body_text = body,
        );
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush");

        Received {
            request_line: request_line.trim_end().to_string(),
            body: received_body,
        }
    });

    OneShotServer {
        base_url: format!("http://{addr}/v1"),
        handle,
    }
}
