// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible chat-completions API.
//!
//! Each call is a single attempt. Failures are classified so a caller can
//! decide whether to retry: rate limiting, 5xx gateway errors, timeouts and
//! connection failures become [`RecapError::ProviderUnavailable`], everything
//! else [`RecapError::Provider`].

use std::time::Duration;

use recap_core::RecapError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// Default API root; `/chat/completions` is appended per request.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    default_model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: &str, model: String) -> Result<Self, RecapError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| RecapError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RecapError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            default_model: model,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one chat-completions request.
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, RecapError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        let body = response.text().await.map_err(|e| RecapError::ProviderUnavailable {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
        })?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| RecapError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            });
        }

        let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!(
                "OpenAI API error ({}): {}",
                api_err.error.type_.as_deref().unwrap_or("unknown"),
                api_err.error.message
            ),
            Err(_) => format!("API returned {status}: {body}"),
        };

        if is_transient_status(status) {
            Err(RecapError::ProviderUnavailable {
                message: detail,
                status: Some(status.as_u16()),
            })
        } else {
            Err(RecapError::Provider {
                message: detail,
                source: None,
            })
        }
    }
}

/// Status codes worth retrying.
pub fn is_transient_status(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn classify_send_error(e: reqwest::Error) -> RecapError {
    if e.is_timeout() || e.is_connect() {
        RecapError::ProviderUnavailable {
            message: format!("HTTP request failed: {e}"),
            status: None,
        }
    } else {
        RecapError::Provider {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("sk-test", base_url, "gpt-3.5-turbo".into()).unwrap()
    }

    fn test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hello")],
            max_tokens: 300,
            temperature: 0.7,
        }
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "- point one\n- point two"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28}
        })
    }

    #[test]
    fn endpoint_appends_path_once() {
        let client = test_client("http://localhost:9999/v1/");
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[tokio::test]
    async fn sends_auth_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let resp = test_client(&server.uri())
            .create_chat_completion(&test_request())
            .await
            .unwrap();
        assert_eq!(resp.id, "chatcmpl-123");
        assert_eq!(resp.usage.unwrap().completion_tokens, 8);
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_chat_completion(&test_request())
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(
            err,
            RecapError::ProviderUnavailable { status: Some(429), .. }
        ));
    }

    #[tokio::test]
    async fn bad_request_is_permanent_and_carries_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_chat_completion(&test_request())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_chat_completion(&test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::Provider { .. }));
    }

    #[tokio::test]
    async fn connection_refused_is_transient() {
        let err = test_client("http://127.0.0.1:1")
            .create_chat_completion(&test_request())
            .await
            .unwrap_err();
        assert!(err.is_transient(), "got: {err}");
    }
}
