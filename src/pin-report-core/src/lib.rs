//! # pin-report-core
//!
//! Public-key-pinning violation reporting. When the TLS layer finds that none
//! of the pins noted for a host match the certificate chain it was served, it
//! builds a [`PinReport`] and hands it to a [`Submitter`], which posts it to
//! the report collection endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   mismatch    ┌──────────────┐   PinReport   ┌──────────────┐
//! │   PinSet     │ ────────────► │  PinReport   │ ────────────► │  Submitter   │
//! │ (trust store)│               │  ::build     │               │ (fire&forget)│
//! └──────────────┘               └──────────────┘               └──────┬───────┘
//!                                                                      │
//!                                              ┌───────────────────────┼──────────┐
//!                                              ▼                       ▼          │
//!                                     ┌────────────────┐     ┌────────────────┐   │
//!                                     │ ReportTransport│     │ ReportObserver │ ◄─┘
//!                                     │   (reqwest)    │     │   (tracing)    │
//!                                     └────────────────┘     └────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Never fails the caller**: building is infallible, submitting returns `()`
//! - **No shared mutable state**: concurrent submissions are independent
//! - **No leaks**: response bodies are drained on every exit path
//!
//! ## Example
//!
//! ```no_run
//! use pin_report_core::{PinReport, PinSet, ReporterConfig, Submitter};
//!
//! let trusted = PinSet::trusted_api_pins();
//! let observed = [r#"pin-sha256="bm90IHRoZSByaWdodCBrZXk=""#];
//!
//! if trusted.verify(&observed).is_err() {
//!     let report = PinReport::build(
//!         "mail.example.com",
//!         "443",
//!         "mail.example.com",
//!         ["-----BEGIN CERTIFICATE-----\n...\n-----END CERTIFICATE-----\n"],
//!         trusted.to_vec(),
//!         "1.0.0",
//!     );
//!     if let Ok(submitter) = Submitter::new(ReporterConfig::default()) {
//!         submitter.submit(&report, "Bridge/1.0.0");
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod pins;
pub mod report;
pub mod submit;
pub mod transport;

pub use config::{ReporterConfig, API_VERSION, TLS_REPORT_URI};
pub use error::{PinError, ReportError};
pub use pins::{pem_encode_certificate, spki_pin, PinSet};
pub use report::{parse_port, PinReport, PIN_LIFETIME_SECS};
pub use submit::{ReportObserver, SubmitEvent, Submitter, TracingObserver};
pub use transport::{
    ReportRequest, ReportTransport, ReqwestTransport, TransportResponse, API_VERSION_HEADER,
    APP_VERSION_HEADER,
};
