//! Fire-and-forget submission of pin reports.
//!
//! [`Submitter::submit`] returns `()`. Every failure (serialization, request
//! construction, transport, non-OK status, draining) is turned into a
//! [`SubmitEvent`] and handed to the configured [`ReportObserver`]; nothing
//! reaches the caller. The default observer, [`TracingObserver`], writes the
//! events to `tracing`.
//!
//! ## Lifecycle
//!
//! ```text
//! serialize ──► build request ──► send ──► log status ──► drain body
//!     │               │             │
//!     └── log ◄───────┴─── log ◄────┘   (abort, no retry)
//! ```
//!
//! `submit` blocks for the duration of the request. Callers on a latency
//! sensitive path should use [`Submitter::spawn`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, instrument, warn};

use crate::config::ReporterConfig;
use crate::error::ReportError;
use crate::report::PinReport;
use crate::transport::{ReportRequest, ReportTransport, ReqwestTransport};

/// Something that happened while submitting a report.
#[derive(Debug)]
pub enum SubmitEvent {
    /// The report could not be serialized; nothing was sent.
    SerializeFailed(ReportError),
    /// The request could not be built; nothing was sent.
    RequestFailed(ReportError),
    /// The request is about to be sent.
    Sending {
        /// Target URI.
        uri: String,
        /// Host the mismatch was observed for.
        hostname: String,
    },
    /// The request could not be delivered.
    TransportFailed(ReportError),
    /// The endpoint answered.
    Reported {
        /// HTTP status code.
        status: u16,
    },
    /// The endpoint answered with something other than 200 OK.
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },
    /// The response body could not be drained.
    DrainFailed(ReportError),
    /// The background submission thread could not be started; nothing was sent.
    SpawnFailed(std::io::Error),
}

/// Receives submission diagnostics.
pub trait ReportObserver: Send + Sync {
    /// Handle one event.
    fn observe(&self, event: SubmitEvent);
}

/// Observer that logs events with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReportObserver for TracingObserver {
    fn observe(&self, event: SubmitEvent) {
        match event {
            SubmitEvent::SerializeFailed(e) => error!(error = %e, "Failed to marshal TLS report"),
            SubmitEvent::RequestFailed(e) => error!(error = %e, "Failed to create http request"),
            SubmitEvent::Sending { uri, hostname } => {
                warn!(uri = %uri, hostname = %hostname, "Reporting TLS mismatch")
            },
            SubmitEvent::TransportFailed(e) => error!(error = %e, "Failed to report TLS mismatch"),
            SubmitEvent::Reported { status } => error!(status, "Reported TLS mismatch"),
            SubmitEvent::UnexpectedStatus { status } => error!(status, "StatusCode was not OK"),
            SubmitEvent::DrainFailed(e) => warn!(error = %e, "Failed to drain report response"),
            SubmitEvent::SpawnFailed(e) => error!(error = %e, "Failed to start report thread"),
        }
    }
}

/// Posts pin reports to the collection endpoint.
///
/// Holds no per-report state; one instance can serve any number of
/// concurrent submissions.
pub struct Submitter {
    config: ReporterConfig,
    transport: Arc<dyn ReportTransport>,
    observer: Arc<dyn ReportObserver>,
}

impl Submitter {
    /// Create a submitter using the blocking `reqwest` transport.
    pub fn new(config: ReporterConfig) -> Result<Self, ReportError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a submitter with a custom transport.
    pub fn with_transport(config: ReporterConfig, transport: Arc<dyn ReportTransport>) -> Self {
        Self {
            config,
            transport,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ReportObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Serialize and post `report`. Never fails; outcomes go to the observer.
    #[instrument(skip_all, fields(hostname = %report.hostname, port = report.port))]
    pub fn submit(&self, report: &PinReport, user_agent: &str) {
        let body = match report.to_json() {
            Ok(body) => body,
            Err(e) => {
                self.observer.observe(SubmitEvent::SerializeFailed(e.into()));
                return;
            },
        };

        let request = match ReportRequest::new(
            &self.config.report_uri,
            body,
            user_agent,
            self.config.api_version,
            &report.app_version,
        ) {
            Ok(request) => request,
            Err(e) => {
                self.observer.observe(SubmitEvent::RequestFailed(e));
                return;
            },
        };

        self.observer.observe(SubmitEvent::Sending {
            uri: request.uri().to_string(),
            hostname: report.hostname.clone(),
        });

        let response = match self.transport.post(&request) {
            Ok(response) => response,
            Err(e) => {
                self.observer.observe(SubmitEvent::TransportFailed(e));
                return;
            },
        };

        let status = response.status();
        self.observer.observe(SubmitEvent::Reported { status });
        if !response.is_ok() {
            self.observer
                .observe(SubmitEvent::UnexpectedStatus { status });
        }

        if let Err(e) = response.finish() {
            self.observer.observe(SubmitEvent::DrainFailed(e));
        }
    }

    /// Submit on a dedicated thread.
    ///
    /// Returns `None` if the thread could not be started; the failure is
    /// reported to the observer.
    pub fn spawn(
        self: &Arc<Self>,
        report: PinReport,
        user_agent: impl Into<String>,
    ) -> Option<JoinHandle<()>> {
        let submitter = Arc::clone(self);
        let user_agent = user_agent.into();

        match thread::Builder::new()
            .name("pin-report".into())
            .spawn(move || submitter.submit(&report, &user_agent))
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                self.observer.observe(SubmitEvent::SpawnFailed(e));
                None
            },
        }
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
