//! Property-based tests for report construction.

use proptest::prelude::*;

use pin_report_core::{parse_port, PinReport, PIN_LIFETIME_SECS};

/// Strategy for PEM-ish certificate strings.
fn pem_chain() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z0-9+/=\n-]{0,128}", 0..4)
}

/// Strategy for pin tokens.
fn pins() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("pin-sha256=\"[A-Za-z0-9+/]{43}=\"", 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    })]

    /// Any input builds a report with the fixed fields set.
    #[test]
    fn build_is_total(
        host in "\\PC*",
        port in "\\PC*",
        noted in "\\PC*",
        chain in pem_chain(),
        known in pins(),
        version in "\\PC*",
    ) {
        let report = PinReport::build(
            host.clone(),
            &port,
            noted.clone(),
            chain.clone(),
            known.clone(),
            version.clone(),
        );

        prop_assert_eq!(
            (report.pin_expiry - report.observed_at).num_seconds(),
            PIN_LIFETIME_SECS
        );
        prop_assert!(!report.include_subdomains);
        prop_assert!(report.validated_chain.is_empty());
        prop_assert_eq!(report.hostname, host);
        prop_assert_eq!(report.noted_hostname, noted);
        prop_assert_eq!(report.served_chain, chain);
        prop_assert_eq!(report.known_pins, known);
        prop_assert_eq!(report.app_version, version);
    }

    /// Serializing and parsing a report gives back the same report.
    #[test]
    fn json_round_trip(
        host in "[a-z0-9.-]{1,64}",
        port in any::<i64>(),
        chain in pem_chain(),
        known in pins(),
        version in "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
    ) {
        let report = PinReport::build(
            host.clone(),
            &port.to_string(),
            host,
            chain,
            known,
            version,
        );

        let json = report.to_json().unwrap();
        let parsed: PinReport = serde_json::from_slice(&json).unwrap();
        prop_assert_eq!(&parsed, &report);
        prop_assert_eq!(parsed.to_json().unwrap(), json);
    }

    /// Any integer port is reported as sent, in range or not.
    #[test]
    fn integer_ports_kept_as_sent(port in any::<i64>()) {
        prop_assert_eq!(parse_port(&port.to_string()), port);
    }

    /// Non-numeric ports degrade to zero.
    #[test]
    fn non_numeric_ports_are_zero(port in "[a-zA-Z:_ ]{1,16}") {
        prop_assert_eq!(parse_port(&port), 0);
    }
}

#[test]
fn build_scenario() {
    let report = PinReport::build(
        "mail.example.com",
        "443",
        "example.com",
        ["PEM1"],
        [r#"pin-sha256="AAA=""#],
        "1.0.0",
    );

    assert_eq!(report.hostname, "mail.example.com");
    assert_eq!(report.port, 443);
    assert_eq!(report.noted_hostname, "example.com");
    assert_eq!(report.served_chain, vec!["PEM1"]);
    assert_eq!(report.known_pins, vec![r#"pin-sha256="AAA=""#]);
    assert_eq!(report.app_version, "1.0.0");
    assert!(!report.include_subdomains);
    assert!(report.validated_chain.is_empty());
}

#[test]
fn non_numeric_port_scenario() {
    let report = PinReport::build("h", "abc", "h", ["PEM1"], ["pin"], "1.0.0");
    assert_eq!(report.port, 0);
}
