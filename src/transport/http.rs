//! reqwest-backed [`Transport`] implementation.

use std::collections::HashMap;

use serde_json::Value;

use crate::transport::{HttpMethod, Transport, TransportError};

/// A transport that sends requests to a single API server over HTTP.
///
/// The transport holds a base URL and a set of default headers applied to
/// every request. Bodies are sent as `application/json`; responses are
/// parsed as JSON, with an empty body treated as `{}`.
///
/// There is no retry logic here. A failed request surfaces as a single
/// [`TransportError`] and the caller decides what to do with it.
///
/// # Example
///
/// ```rust
/// use apistate::transport::HttpTransport;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("Authorization".to_string(), "Bearer token".to_string());
///
/// let transport = HttpTransport::with_headers("https://api.example.com", headers);
/// assert_eq!(transport.base_url(), "https://api.example.com");
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL without a trailing slash (e.g. `https://api.example.com`).
    base_url: String,
    /// Headers applied to every request.
    default_headers: HashMap<String, String>,
}

impl HttpTransport {
    /// Creates a transport for the given base URL with no default headers.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g. TLS
    /// initialization failure).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_headers(base_url, HashMap::new())
    }

    /// Creates a transport with default headers (authentication tokens,
    /// content negotiation, and so on).
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created.
    #[must_use]
    pub fn with_headers(
        base_url: impl Into<String>,
        default_headers: HashMap<String, String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            default_headers,
        }
    }

    /// Returns the base URL for this transport.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default headers for this transport.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    async fn dispatch(
        &self,
        path: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };

        tracing::debug!(%method, %url, "sending request");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Patch => self.client.patch(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        for (key, value) in &self.default_headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = payload {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let response = builder.send().await?;
        let code = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        let body = if text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw_body": text }))
        };

        if (200..300).contains(&code) {
            Ok(body)
        } else {
            Err(TransportError::Response {
                code,
                method,
                path: path.to_string(),
                message: body.to_string(),
            })
        }
    }
}

impl Transport for HttpTransport {
    async fn create(
        &self,
        path: &str,
        method: HttpMethod,
        payload: &Value,
    ) -> Result<Value, TransportError> {
        self.dispatch(path, method, Some(payload)).await
    }

    async fn read(&self, path: &str, method: HttpMethod) -> Result<Value, TransportError> {
        self.dispatch(path, method, None).await
    }

    async fn update(
        &self,
        path: &str,
        method: HttpMethod,
        payload: &Value,
    ) -> Result<Value, TransportError> {
        self.dispatch(path, method, Some(payload)).await
    }

    async fn delete(
        &self,
        path: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.dispatch(path, method, payload).await
    }
}
