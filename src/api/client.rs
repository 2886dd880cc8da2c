//! Gemini REST client.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::gemini::{GenerateContentBody, GenerateContentResponse};
use super::{parse_retry_after_secs, GenerateRequest, ModelClient};
use crate::config::ModelConfig;
use crate::error::ApiError;

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Build a client from resolved model configuration.
    pub fn new(config: &ModelConfig, timeout: Duration) -> Self {
        // Fall back to reqwest defaults if builder creation fails for any reason.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.trim().to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    /// Send one request. Per-request settings override the client defaults.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        let mut effective = request.clone();
        effective.temperature = effective.temperature.or(Some(self.temperature));
        effective.max_output_tokens = effective.max_output_tokens.or(Some(self.max_output_tokens));
        let body = GenerateContentBody::from_request(&effective);

        let url = self.endpoint();
        debug!(%url, prompt_chars = request.prompt.len(), "sending generateContent request");
        let mut req = self.http.post(&url).json(&body);
        if !self.api_key.is_empty() {
            req = req.header("x-goog-api-key", &self.api_key);
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_secs = parse_retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status, body, retry_after_secs));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(ApiError::from)?
            .into_text()
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        GeminiClient::generate(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{Classify, ErrorClass, NoJitter, RetryExecutor, RetryPolicy};
    use crate::testsupport::RecordingSleeper;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const OK_BODY: &str =
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"done"}]},"finishReason":"STOP"}]}"#;
    const QUOTA_BODY: &str = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED","details":[{"retryDelay": "41s"}]}}"#;

    fn http_response(status_line: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Serve one canned response per connection, in order, and return the
    /// raw request heads that were received.
    async fn serve(responses: Vec<String>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().await.expect("accept");
                let mut request_buf = [0u8; 8192];
                let n = stream.read(&mut request_buf).await.unwrap_or(0);
                requests.push(String::from_utf8_lossy(&request_buf[..n]).to_string());
                let _ = stream.write_all(response.as_bytes()).await;
            }
            requests
        });
        (format!("http://{addr}"), handle)
    }

    fn client_for(base_url: String) -> GeminiClient {
        let config = ModelConfig {
            base_url,
            api_key: "test-key".to_string(),
            model: "gemini-test".to_string(),
            ..ModelConfig::default()
        };
        GeminiClient::new(&config, Duration::from_secs(3))
    }

    #[tokio::test]
    async fn generate_posts_to_model_endpoint_with_key_header() {
        let (base_url, server) = serve(vec![http_response("200 OK", "", OK_BODY)]).await;
        let client = client_for(base_url);

        let text = client
            .generate(&GenerateRequest::new("hello"))
            .await
            .expect("success");

        assert_eq!(text, "done");
        let requests = server.await.unwrap();
        let head = requests[0].to_ascii_lowercase();
        assert!(
            head.starts_with("post /models/gemini-test:generatecontent"),
            "request: {head}"
        );
        assert!(head.contains("x-goog-api-key: test-key"), "request: {head}");
    }

    #[tokio::test]
    async fn quota_response_maps_to_rate_limited_status() {
        let (base_url, _server) = serve(vec![http_response(
            "429 Too Many Requests",
            "Retry-After: 12\r\n",
            QUOTA_BODY,
        )])
        .await;
        let client = client_for(base_url);

        let err = client
            .generate(&GenerateRequest::new("hello"))
            .await
            .expect_err("429 expected");

        assert!(matches!(err, ApiError::Status { code: 429, .. }));
        assert_eq!(err.classify(), ErrorClass::RateLimited);
        assert_eq!(err.suggested_delay(), Some(Duration::from_secs(12)));
    }

    #[tokio::test]
    async fn executor_recovers_from_quota_response() {
        let (base_url, server) = serve(vec![
            http_response("429 Too Many Requests", "", QUOTA_BODY),
            http_response("200 OK", "", OK_BODY),
        ])
        .await;
        let client = client_for(base_url);
        let sleeper = Arc::new(RecordingSleeper::default());
        let executor = RetryExecutor::new(RetryPolicy::default().with_max_retries(2))
            .with_sleeper(sleeper.clone())
            .with_jitter(Arc::new(NoJitter));
        let request = GenerateRequest::new("hello");

        let text = executor
            .execute(|| client.generate(&request))
            .await
            .expect("retry should recover");

        assert_eq!(text, "done");
        assert_eq!(server.await.unwrap().len(), 2);
        // Body hint (41s) is below the 180s floor; backoff for attempt 1 follows.
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(180), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn generate_respects_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept one connection and intentionally keep it open so the client
        // must hit its configured timeout.
        let _accept = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = ModelConfig {
            base_url: format!("http://{addr}"),
            ..ModelConfig::default()
        };
        let client = GeminiClient::new(&config, Duration::from_millis(50));
        let err = client
            .generate(&GenerateRequest::new("hello"))
            .await
            .expect_err("timeout expected");
        match &err {
            ApiError::Http(inner) => assert!(inner.is_timeout(), "unexpected error: {inner}"),
            other => panic!("expected timeout Http error, got: {other}"),
        }
        assert_eq!(err.classify(), ErrorClass::Transient);
    }

    #[test]
    fn endpoint_accepts_prefixed_model_names() {
        let config = ModelConfig {
            base_url: "https://example.com/v1beta/".to_string(),
            model: "models/gemini-pro".to_string(),
            ..ModelConfig::default()
        };
        let client = GeminiClient::new(&config, Duration::from_secs(1));
        assert_eq!(
            client.endpoint(),
            "https://example.com/v1beta/models/gemini-pro:generateContent"
        );
    }
}
