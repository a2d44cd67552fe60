//! REST client for the record store.

use crate::config::TuiConfig;
use backoffice_core::DataSourceError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ApiClientError> for DataSourceError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Http(err) if err.is_decode() => DataSourceError::parse(err.to_string()),
            ApiClientError::Http(err) => DataSourceError::network(err.to_string()),
            ApiClientError::Status { status, message }
                if (400..500).contains(&status) && !message.trim().is_empty() =>
            {
                DataSourceError::validation(message)
            }
            ApiClientError::Status { status, message } => DataSourceError::server(status, message),
            ApiClientError::Serde(err) => DataSourceError::parse(err.to_string()),
            ApiClientError::InvalidResponse(reason) => DataSourceError::parse(reason),
            ApiClientError::Config(reason) => DataSourceError::network(reason),
        }
    }
}

/// Bearer-authenticated JSON client bound to one base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        Self::with_token(
            &config.api_base_url,
            &config.auth.token,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn with_token(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: build_auth_headers(token)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .get(self.url(path))
            .headers(self.auth_header.clone());
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        let body = Self::read_body(response).await?;
        Self::decode(&body)
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Self::decode(&body)
    }

    /// PUT a JSON body. Returns `None` when the server answers without a body.
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<Option<T>, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .put(self.url(path))
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Self::decode(&body).map(Some)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiClientError> {
        let response = self
            .client
            .delete(self.url(path))
            .headers(self.auth_header.clone())
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Body text of a 2xx response, or the status error with the server's message.
    async fn read_body(response: reqwest::Response) -> Result<String, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }
        tracing::warn!(status = status.as_u16(), "request rejected");
        Err(ApiClientError::Status {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiClientError> {
        if body.trim().is_empty() {
            return Err(ApiClientError::InvalidResponse("empty response body".to_string()));
        }
        Ok(serde_json::from_str(body)?)
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Human-readable message carried by an error response, if any.
///
/// JSON bodies with `error` or `message` win; short plain-text bodies are
/// used as-is; HTML error pages are ignored.
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        return body.message.or(body.error).unwrap_or_default();
    }
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') || trimmed.len() > 200 {
        tracing::debug!(status = status.as_u16(), "error response without usable message");
        return String::new();
    }
    trimmed.to_string()
}

fn build_auth_headers(token: &str) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    let value = format!("Bearer {}", token);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let text = r#"{"error":"bad_request","message":"title is required"}"#;
        assert_eq!(error_message(StatusCode::BAD_REQUEST, text), "title is required");
    }

    #[test]
    fn test_error_message_uses_error_field() {
        let text = r#"{"error":"step not found"}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, text), "step not found");
    }

    #[test]
    fn test_error_message_plain_text_and_html() {
        assert_eq!(error_message(StatusCode::CONFLICT, "duplicate name\n"), "duplicate name");
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html><body>502</body></html>"),
            ""
        );
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, ""), "");
    }

    #[test]
    fn test_status_errors_map_to_data_source_errors() {
        let err: DataSourceError = ApiClientError::Status {
            status: 422,
            message: "order must be positive".to_string(),
        }
        .into();
        assert_eq!(err, DataSourceError::validation("order must be positive"));

        let err: DataSourceError = ApiClientError::Status {
            status: 400,
            message: String::new(),
        }
        .into();
        assert_eq!(err, DataSourceError::server(400, ""));

        let err: DataSourceError = ApiClientError::Status {
            status: 500,
            message: "database unavailable".to_string(),
        }
        .into();
        assert_eq!(err, DataSourceError::server(500, "database unavailable"));
    }

    #[test]
    fn test_invalid_response_maps_to_parse() {
        let err: DataSourceError = ApiClientError::InvalidResponse("empty".to_string()).into();
        assert!(matches!(err, DataSourceError::Parse { .. }));
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let err = RestClient::with_token("http://localhost", "abc\ndef", Duration::from_secs(1));
        assert!(matches!(err, Err(ApiClientError::Config(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = RestClient::with_token("http://localhost:8080/", "t", Duration::from_secs(1))
            .expect("client");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
