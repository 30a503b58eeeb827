//! pin-report CLI - inspect trusted pins and send pin validation failure reports.
//!
//! Mainly useful for checking that the collection endpoint accepts reports
//! and for previewing the exact payload that would be posted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pin_report_core::{
    pem_encode_certificate, spki_pin, PinReport, PinSet, ReportObserver, ReporterConfig,
    SubmitEvent, Submitter, TracingObserver, TLS_REPORT_URI,
};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Public-key-pinning violation reporter.
#[derive(Parser)]
#[command(name = "pin-report")]
#[command(version = VERSION)]
#[command(about = "Build and send public-key-pinning violation reports")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in trusted pins
    Pins,

    /// Print the pin-sha256 token of DER-encoded SubjectPublicKeyInfo files
    Spki {
        /// DER SubjectPublicKeyInfo file (repeatable)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the report that would be sent, without sending it
    Preview(ReportArgs),

    /// Build a report and post it to the collection endpoint
    Send {
        #[command(flatten)]
        report: ReportArgs,

        /// User-Agent header
        #[arg(long, default_value_t = format!("pin-report/{}", VERSION))]
        user_agent: String,

        /// Report collection endpoint
        #[arg(long, env = "PIN_REPORT_URI", default_value = TLS_REPORT_URI)]
        uri: String,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Host of the request that failed pin validation
    #[arg(long)]
    host: String,

    /// Port of the request that failed pin validation
    #[arg(long, default_value = "443")]
    port: String,

    /// Host the pins were noted for (defaults to --host)
    #[arg(long)]
    noted_host: Option<String>,

    /// PEM bundle or DER certificate of the served chain (repeatable)
    #[arg(long = "cert")]
    certs: Vec<PathBuf>,

    /// Known pin token (repeatable; defaults to the built-in pins)
    #[arg(long = "pin")]
    pins: Vec<String>,

    /// Version of the reporting application
    #[arg(long, default_value = VERSION)]
    app_version: String,
}

impl ReportArgs {
    fn build(self) -> anyhow::Result<PinReport> {
        let mut chain = Vec::new();
        for path in &self.certs {
            let raw = std::fs::read(path)
                .with_context(|| format!("Failed to read certificate {}", path.display()))?;
            chain.extend(load_certificates(&raw));
        }

        let known_pins = if self.pins.is_empty() {
            PinSet::trusted_api_pins().to_vec()
        } else {
            self.pins
        };
        let noted_host = self.noted_host.unwrap_or_else(|| self.host.clone());

        Ok(PinReport::build(
            self.host,
            &self.port,
            noted_host,
            chain,
            known_pins,
            self.app_version,
        ))
    }
}

/// PEM strings for a certificate file: every certificate of a PEM bundle, or
/// the armoured form of a single DER certificate.
fn load_certificates(raw: &[u8]) -> Vec<String> {
    match std::str::from_utf8(raw) {
        Ok(text) if text.contains("-----BEGIN CERTIFICATE-----") => split_pem_chain(text),
        _ => vec![pem_encode_certificate(raw)],
    }
}

/// Split a PEM bundle into one string per certificate.
fn split_pem_chain(bundle: &str) -> Vec<String> {
    const END: &str = "-----END CERTIFICATE-----";

    let mut certs = Vec::new();
    let mut rest = bundle;
    while let Some(start) = rest.find("-----BEGIN CERTIFICATE-----") {
        let Some(end) = rest[start..].find(END) else {
            break;
        };
        let stop = start + end + END.len();
        certs.push(format!("{}\n", &rest[start..stop]));
        rest = &rest[stop..];
    }
    certs
}

/// Logs every event and remembers whether the report was accepted.
struct CliObserver {
    accepted: std::sync::atomic::AtomicBool,
}

impl ReportObserver for CliObserver {
    fn observe(&self, event: SubmitEvent) {
        if let SubmitEvent::Reported { status: 200 } = event {
            self.accepted
                .store(true, std::sync::atomic::Ordering::SeqCst);
        }
        TracingObserver.observe(event);
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Pins => {
            for pin in PinSet::trusted_api_pins().iter() {
                println!("{}", pin);
            }
            Ok(true)
        },
        Commands::Spki { files } => {
            for path in &files {
                let der = std::fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                println!("{}  {}", spki_pin(&der), path.display());
            }
            Ok(true)
        },
        Commands::Preview(args) => {
            let report = args.build()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(true)
        },
        Commands::Send {
            report,
            user_agent,
            uri,
        } => {
            let report = report.build()?;
            let observer = Arc::new(CliObserver {
                accepted: std::sync::atomic::AtomicBool::new(false),
            });
            let submitter = Submitter::new(ReporterConfig::with_report_uri(uri))?
                .with_observer(observer.clone());

            submitter.submit(&report, &user_agent);

            let accepted = observer.accepted.load(std::sync::atomic::Ordering::SeqCst);
            if accepted {
                println!("Report accepted");
            } else {
                println!("Report not accepted (see log for details)");
            }
            Ok(accepted)
        },
    }
}

/// `RUST_LOG` when set and valid, otherwise debug with `--verbose` and warn without.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

fn main() {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => {},
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        },
    }
}
