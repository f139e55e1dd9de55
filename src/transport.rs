//! HTTP transport abstraction.
//!
//! The client only needs one request/response exchange at a time, so the
//! trait exposes exactly that. [`ReqwestTransport`] is the production
//! implementation; tests substitute scripted transports.

use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Error, Result, TransportError};

/// A single outbound HTTP request
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A GET request with no body
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request with the given body
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A minimal HTTP response
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as text, replacing invalid UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the status and raw body
    async fn exchange(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportError>;
}

/// [`reqwest`]-backed [`Transport`]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Build a client honoring the timeout and user agent in `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let inner = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            inner,
            timeout: config.request_timeout,
        })
    }

    /// Wrap an existing client
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self {
            inner,
            timeout: None,
        }
    }

    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout.unwrap_or_default())
        } else if error.is_connect() {
            TransportError::Connection(error.to_string())
        } else {
            TransportError::Request(error)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self.inner.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
