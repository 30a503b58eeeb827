//! Trust store of public-key pins.
//!
//! A [`PinSet`] is an ordered, immutable list of RFC 7469 pin tokens of the
//! form `pin-sha256="<base64>"`. The TLS layer compares the pins it observes
//! against the set; when nothing matches it builds a
//! [`PinReport`](crate::report::PinReport) and hands it to the submitter.
//!
//! ## Built-in pins
//!
//! [`PinSet::trusted_api_pins`] holds the pins for the API itself (current,
//! hot and cold keys) followed by the proxy fronts. All proxy servers share
//! the same keys.

use std::sync::{Arc, OnceLock};

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::PinError;

/// Pins of the API and its proxies, in order of preference.
const TRUSTED_API_PINS: [&str; 7] = [
    r#"pin-sha256="drtmcR2kFkM8qJClsuWgUzxgBkePfRCkRpqUesyDmeE=""#, // current
    r#"pin-sha256="YRGlaY0jyJ4Jw2/4M8FIftwbDIQfh8Sdro96CeEel54=""#, // hot
    r#"pin-sha256="AfMENBVvOS8MnISprtvyPsjKlPooqh8nMB/pvCrpJpw=""#, // cold
    r#"pin-sha256="EU6TS9MO0L/GsDHvVc9D5fChYLNy5JdGYpJw0ccgetM=""#, // proxy main
    r#"pin-sha256="iKPIHPnDNqdkvOnTClQ8zQAIKG0XavaPkcEo0LBAABA=""#, // proxy backup 1
    r#"pin-sha256="MSlVrBCdL0hKyczvgYVSRNm88RicyY04Q2y5qrBt0xA=""#, // proxy backup 2
    r#"pin-sha256="C2UxW0T1Ckl9s+8cXfjXxlEqwAfPM4HiW2y3UdtBeCw=""#, // proxy backup 3
];

static TRUSTED: OnceLock<PinSet> = OnceLock::new();

/// Immutable, non-empty, ordered set of pin tokens.
///
/// Cloning is cheap; clones share the same backing storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSet {
    pins: Arc<[String]>,
}

impl PinSet {
    /// Create a pin set from the given tokens, preserving their order.
    pub fn new<I, S>(pins: I) -> Result<Self, PinError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pins: Vec<String> = pins.into_iter().map(Into::into).collect();
        if pins.is_empty() {
            return Err(PinError::EmptyPinSet);
        }
        Ok(Self { pins: pins.into() })
    }

    /// The pins trusted for the API endpoint and its proxy fronts.
    pub fn trusted_api_pins() -> &'static PinSet {
        TRUSTED.get_or_init(|| Self {
            pins: TRUSTED_API_PINS.iter().map(|p| (*p).to_string()).collect(),
        })
    }

    /// The pins, in order.
    pub fn pins(&self) -> &[String] {
        &self.pins
    }

    /// Iterate over the pins in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pins.iter().map(String::as_str)
    }

    /// Number of pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Always `false`; a pin set cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Whether `pin` is one of the trusted tokens.
    pub fn contains(&self, pin: &str) -> bool {
        self.iter().any(|p| p == pin)
    }

    /// Owned copy of the pins, suitable as the `known-pins` of a report.
    pub fn to_vec(&self) -> Vec<String> {
        self.pins.to_vec()
    }

    /// Check a handshake's observed pins against the set.
    ///
    /// Succeeds if any observed pin is trusted.
    pub fn verify<S: AsRef<str>>(&self, observed: &[S]) -> Result<(), PinError> {
        if observed.iter().any(|pin| self.contains(pin.as_ref())) {
            Ok(())
        } else {
            Err(PinError::Mismatch)
        }
    }
}

impl<'a> IntoIterator for &'a PinSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.pins.iter()
    }
}

/// Compute the `pin-sha256` token for a DER-encoded SubjectPublicKeyInfo.
pub fn spki_pin(spki_der: &[u8]) -> String {
    let digest = Sha256::digest(spki_der);
    format!(
        "pin-sha256=\"{}\"",
        base64::engine::general_purpose::STANDARD.encode(digest)
    )
}

/// PEM-armour a DER certificate (RFC 7468, 64-column lines).
pub fn pem_encode_certificate(der: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(der);
    let mut pem = String::with_capacity(encoded.len() + encoded.len() / 64 + 64);
    pem.push_str("-----BEGIN CERTIFICATE-----\n");
    for line in encoded.as_bytes().chunks(64) {
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str("-----END CERTIFICATE-----\n");
    pem
}
