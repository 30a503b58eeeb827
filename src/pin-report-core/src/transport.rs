//! HTTP transport for pin reports.
//!
//! [`ReportTransport`] is the seam between the submitter and the network.
//! Production code uses [`ReqwestTransport`], a blocking `reqwest` client with
//! explicit timeouts; tests substitute their own implementation.
//!
//! A [`TransportResponse`] owns the response body and drains it when dropped,
//! so the underlying connection is released on every exit path.

use std::fmt;
use std::io::{self, Read};

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use tracing::debug;

use crate::config::ReporterConfig;
use crate::error::ReportError;

/// Header carrying the API version.
pub const API_VERSION_HEADER: &str = "x-pm-apiversion";

/// Header carrying the reporting application's version.
pub const APP_VERSION_HEADER: &str = "x-pm-appversion";

/// A fully constructed report POST.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    uri: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ReportRequest {
    /// Construct the POST for a serialized report.
    ///
    /// Fails if `uri` is not an absolute http(s) URL or if a header value
    /// contains characters not allowed in HTTP headers.
    pub fn new(
        uri: &str,
        body: Vec<u8>,
        user_agent: &str,
        api_version: u32,
        app_version: &str,
    ) -> Result<Self, ReportError> {
        let uri = Url::parse(uri).map_err(|e| ReportError::InvalidRequest {
            message: format!("Invalid report URI {:?}: {}", uri, e),
        })?;
        if !matches!(uri.scheme(), "http" | "https") {
            return Err(ReportError::InvalidRequest {
                message: format!("Unsupported report URI scheme: {}", uri.scheme()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value("User-Agent", user_agent)?);
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from(api_version),
        );
        headers.insert(
            HeaderName::from_static(APP_VERSION_HEADER),
            header_value(APP_VERSION_HEADER, app_version)?,
        );

        Ok(Self { uri, headers, body })
    }

    /// Target URI.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// JSON body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ReportError> {
    HeaderValue::from_bytes(value.as_bytes()).map_err(|e| ReportError::InvalidRequest {
        message: format!("Invalid {} header value: {}", name, e),
    })
}

/// A response whose body is drained on drop.
pub struct TransportResponse {
    status: u16,
    body: Option<Box<dyn Read + Send>>,
}

impl TransportResponse {
    /// Wrap a status code and an unread body.
    pub fn new(status: u16, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            body: Some(Box::new(body)),
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is exactly 200 OK.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Drain and close the body, returning the number of bytes discarded.
    pub fn finish(mut self) -> Result<u64, ReportError> {
        Ok(self.drain()?)
    }

    fn drain(&mut self) -> io::Result<u64> {
        match self.body.take() {
            Some(mut body) => io::copy(&mut body, &mut io::sink()),
            None => Ok(0),
        }
    }
}

impl Drop for TransportResponse {
    fn drop(&mut self) {
        if let Err(e) = self.drain() {
            debug!(error = %e, "Discarding undrained response body");
        }
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("drained", &self.body.is_none())
            .finish()
    }
}

/// Delivers report requests.
pub trait ReportTransport: Send + Sync {
    /// POST the request and return the response, whatever its status.
    fn post(&self, request: &ReportRequest) -> Result<TransportResponse, ReportError>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the timeouts from `config`.
    pub fn new(config: &ReporterConfig) -> Result<Self, ReportError> {
        let mut builder = ClientBuilder::new();
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(1)
            .user_agent(format!("pin-report/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Transport {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl ReportTransport for ReqwestTransport {
    fn post(&self, request: &ReportRequest) -> Result<TransportResponse, ReportError> {
        let response = self
            .client
            .post(request.uri().clone())
            .headers(request.headers().clone())
            .body(request.body().to_vec())
            .send()
            .map_err(|e| ReportError::Transport {
                message: format!("Request to {} failed: {}", request.uri(), e),
            })?;

        Ok(TransportResponse::new(response.status().as_u16(), response))
    }
}
