//! Configuration for the report submitter.

use std::time::Duration;

/// Address that pin validation failure reports are posted to.
pub const TLS_REPORT_URI: &str = "https://reports.protonmail.ch/reports/tls";

/// Value of the `x-pm-apiversion` header.
pub const API_VERSION: u32 = 3;

/// Configuration for [`Submitter`](crate::submit::Submitter).
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Report collection endpoint.
    pub report_uri: String,
    /// API version sent with every report.
    pub api_version: u32,
    /// TCP connect timeout of the default transport.
    pub connect_timeout: Duration,
    /// Total request timeout of the default transport.
    pub request_timeout: Duration,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            report_uri: TLS_REPORT_URI.into(),
            api_version: API_VERSION,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            use_system_proxy: true,
        }
    }
}

impl ReporterConfig {
    /// Default configuration posting to `report_uri` instead.
    pub fn with_report_uri(report_uri: impl Into<String>) -> Self {
        Self {
            report_uri: report_uri.into(),
            ..Self::default()
        }
    }
}
