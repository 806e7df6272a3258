//! HTTP transport and response verification.

use async_trait::async_trait;
use mastery_core::FetchError;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST with a JSON body
    Post,
}

impl Method {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method
    pub method: Method,

    /// Absolute URL
    pub url: String,

    /// JSON body for POST requests
    pub body: Option<Value>,
}

/// Response as received, before any verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// `Content-Type` header, if present
    pub content_type: Option<String>,

    /// Body text
    pub body: String,
}

impl RawResponse {
    /// A 200 response with a JSON body.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.into(),
        }
    }
}

/// Something that can carry a request to a server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request. Connection failures are `NetworkError`s.
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, FetchError>;
}

/// Transport over `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    /// HTTP client
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose client gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, FetchError> {
        debug!("{} {}", request.method.as_str(), request.url);

        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => {
                let builder = self.client.post(&request.url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::network(format!("request to {} timed out", request.url))
            } else {
                FetchError::network(format!("request to {} failed: {}", request.url, e))
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(format!("failed to read body: {}", e)))?;

        Ok(RawResponse { status, content_type, body })
    }
}

/// Verify status and content type, then parse the body as JSON.
pub fn parse_json_response(raw: &RawResponse) -> Result<Value, FetchError> {
    if !(200..300).contains(&raw.status) {
        return Err(FetchError::network(format!("server responded with status {}", raw.status)));
    }

    let is_json = raw
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(FetchError::malformed(format!(
            "expected application/json, got {}",
            raw.content_type.as_deref().unwrap_or("no content type")
        )));
    }

    serde_json::from_str(&raw.body).map_err(|e| {
        // Well-formed JSON whose number does not fit an f64
        if e.is_syntax() && e.to_string().starts_with("number out of range") {
            FetchError::validation(format!("non-finite number in body: {}", e))
        } else {
            FetchError::malformed(format!("invalid JSON body: {}", e))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::FailureKind;

    #[test]
    fn test_parse_ok() {
        let value = parse_json_response(&RawResponse::json(r#"{"percent": 42}"#)).unwrap();
        assert_eq!(value["percent"], 42);
    }

    #[test]
    fn test_non_success_status_is_network_error() {
        let raw = RawResponse { status: 503, ..RawResponse::json("{}") };
        assert_eq!(parse_json_response(&raw).unwrap_err().kind, FailureKind::NetworkError);
    }

    #[test]
    fn test_wrong_or_missing_content_type_is_malformed() {
        let html = RawResponse {
            content_type: Some("text/html".to_string()),
            ..RawResponse::json("<html></html>")
        };
        assert_eq!(parse_json_response(&html).unwrap_err().kind, FailureKind::MalformedResponse);

        let bare = RawResponse { content_type: None, ..RawResponse::json("{}") };
        assert_eq!(parse_json_response(&bare).unwrap_err().kind, FailureKind::MalformedResponse);
    }

    #[test]
    fn test_bad_body_is_malformed() {
        let err = parse_json_response(&RawResponse::json("{not json")).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedResponse);
    }

    #[test]
    fn test_out_of_range_number_is_validation_error() {
        let err = parse_json_response(&RawResponse::json(r#"{"percent": 1e400}"#)).unwrap_err();
        assert_eq!(err.kind, FailureKind::ValidationError);

        let err = parse_json_response(&RawResponse::json(r#"{"percent": 12"#)).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedResponse);
    }

    #[test]
    fn test_content_type_containing_json_is_accepted() {
        let raw = RawResponse {
            content_type: Some("text/plain, application/json".to_string()),
            ..RawResponse::json("{}")
        };
        assert!(parse_json_response(&raw).is_ok());
    }

    #[test]
    fn test_content_type_is_case_insensitive() {
        let raw = RawResponse {
            content_type: Some("Application/JSON".to_string()),
            ..RawResponse::json("[]")
        };
        assert!(parse_json_response(&raw).is_ok());
    }
}
