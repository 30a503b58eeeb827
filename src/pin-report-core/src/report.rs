//! Pin validation failure reports.
//!
//! The payload layout follows RFC 7469 section 3 with one extension,
//! `app-version`, used by the collection endpoint to attribute reports.
//!
//! ```json
//! {
//!   "date-time": "2024-05-01T12:00:00Z",
//!   "hostname": "mail.example.com",
//!   "port": 443,
//!   "effective-expiration-date": "2025-05-01T12:00:00Z",
//!   "include-subdomains": false,
//!   "noted-hostname": "example.com",
//!   "served-certificate-chain": ["-----BEGIN CERTIFICATE-----\n..."],
//!   "validated-certificate-chain": [],
//!   "known-pins": ["pin-sha256=\"d6qzRu9zOECb90Uez27xWltNsj0e1Md7GkYYkVoZWmM=\""],
//!   "app-version": "1.0.0"
//! }
//! ```

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long the noted pins stay valid after a report is observed.
pub const PIN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// A single pin validation failure, ready to be serialized and posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinReport {
    /// When pin validation failed.
    #[serde(rename = "date-time", with = "rfc3339")]
    pub observed_at: DateTime<Utc>,

    /// Host of the original request.
    pub hostname: String,

    /// Port of the original request, as sent; `0` if it was not an integer.
    pub port: i64,

    /// When the noted pins are considered stale.
    #[serde(rename = "effective-expiration-date", with = "rfc3339")]
    pub pin_expiry: DateTime<Utc>,

    /// Whether includeSubDomains was noted for the pinned host.
    #[serde(rename = "include-subdomains")]
    pub include_subdomains: bool,

    /// Host under which the pins were noted.
    #[serde(rename = "noted-hostname")]
    pub noted_hostname: String,

    /// PEM certificates as served by the peer.
    #[serde(rename = "served-certificate-chain")]
    pub served_chain: Vec<String>,

    /// PEM certificates as rebuilt by the local verifier.
    #[serde(rename = "validated-certificate-chain")]
    pub validated_chain: Vec<String>,

    /// Pins noted for the host.
    #[serde(rename = "known-pins")]
    pub known_pins: Vec<String>,

    /// Version of the reporting application.
    #[serde(rename = "app-version")]
    pub app_version: String,
}

impl PinReport {
    /// Build a report for a mismatch observed now.
    ///
    /// Never fails. A `port` that is not an integer is reported as `0`.
    pub fn build<C, P>(
        host: impl Into<String>,
        port: &str,
        noted_host: impl Into<String>,
        served_chain: C,
        known_pins: P,
        app_version: impl Into<String>,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self::build_at(
            Utc::now(),
            host,
            port,
            noted_host,
            served_chain,
            known_pins,
            app_version,
        )
    }

    /// Build a report for a mismatch observed at `now`.
    pub fn build_at<C, P>(
        now: DateTime<Utc>,
        host: impl Into<String>,
        port: &str,
        noted_host: impl Into<String>,
        served_chain: C,
        known_pins: P,
        app_version: impl Into<String>,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let observed_at = now.trunc_subsecs(0);

        Self {
            observed_at,
            hostname: host.into(),
            port: parse_port(port),
            pin_expiry: observed_at + TimeDelta::seconds(PIN_LIFETIME_SECS),
            include_subdomains: false,
            noted_hostname: noted_host.into(),
            served_chain: served_chain.into_iter().map(Into::into).collect(),
            validated_chain: Vec::new(),
            known_pins: known_pins.into_iter().map(Into::into).collect(),
            app_version: app_version.into(),
        }
    }

    /// Canonical JSON encoding of the report.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Parse a port, falling back to `0` for anything that is not an integer.
///
/// Integers outside the TCP port range are kept as sent; they are evidence.
/// Reporting must go ahead even when the port is garbage.
pub fn parse_port(port: &str) -> i64 {
    port.parse().unwrap_or(0)
}

/// RFC 3339 timestamps at second precision with a `Z` offset.
mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
