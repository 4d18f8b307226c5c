use reqwest::StatusCode;

use chat_api::error::parse_error_message;
use chat_api::ChatApiError;

#[test]
fn parse_error_message_prefers_json_message() {
    let body = r#"{"error":{"code":"invalid_api_key","message":"Incorrect API key provided"}}"#;
    let message = parse_error_message(StatusCode::UNAUTHORIZED, body);
    assert_eq!(message, "Incorrect API key provided");
}

#[test]
fn parse_error_message_accepts_string_error() {
    let body = r#"{"error":"model not found"}"#;
    let message = parse_error_message(StatusCode::NOT_FOUND, body);
    assert_eq!(message, "model not found");
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "upstream exploded";
    let message = parse_error_message(StatusCode::BAD_GATEWAY, body);
    assert_eq!(message, "upstream exploded");

    let body = r#"{"error":{"code":"x"}}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(message, body);
}

#[test]
fn parse_error_message_uses_status_reason_for_empty_body() {
    let message = parse_error_message(StatusCode::SERVICE_UNAVAILABLE, "");
    assert_eq!(message, "Service Unavailable");
}

#[test]
fn status_error_display_includes_code_and_message() {
    let error = ChatApiError::Status(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
    assert_eq!(error.to_string(), "HTTP 429 Too Many Requests slow down");
    assert_eq!(ChatApiError::MissingApiKey.to_string(), "API key is required");
}
