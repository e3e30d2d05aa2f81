// tests/logging_smoke.rs
use std::collections::BTreeMap;
use std::time::Duration;

use anonprobe::probes::snmp_lib::SnmpCapability;
use anonprobe::probes::{Probe, SnmpProbe};
use anonprobe::scan::render_snmp_human;
use anonprobe::types::{LibraryProbe, ProbeTarget, SnmpCheckReport, SnmpProbeOutcome};

#[tokio::test]
async fn logging_smoke() {
    // initialize tracing so debug logs show with RUST_LOG=debug
    anonprobe::init_tracing();
    anonprobe::init_tracing();

    // nothing answers on a freshly released UDP port
    let sock = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = sock.local_addr().unwrap().port();
    drop(sock);

    let probe = SnmpProbe::new("public", SnmpCapability::Unavailable("test".into()));
    assert_eq!(probe.default_port(), 161);
    let report = probe.probe(&ProbeTarget::new("127.0.0.1", port, Duration::from_millis(200))).await;
    eprintln!("report: {:#?}", report);
    assert!(!report.valid);
}

#[test]
fn human_snmp_report_lines() {
    let mut collected = BTreeMap::new();
    collected.insert("sysName".to_string(), "edge-rtr".to_string());
    let report = SnmpCheckReport {
        target: "192.0.2.1".into(),
        port: 161,
        community: "public".into(),
        valid: true,
        library: LibraryProbe::Completed(SnmpProbeOutcome {
            succeeded: true,
            detail: "SNMPv1 enumeration succeeded:\nsysName: edge-rtr".into(),
            collected,
        }),
        raw: None,
        checked_at: chrono::Utc::now(),
    };
    let text = render_snmp_human(&report);
    assert!(text.contains("Testing SNMPv1 community 'public' on 192.0.2.1:161"));
    assert!(text.contains("Valid community string detected."));
    assert!(text.contains("sysName: edge-rtr"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["library"]["status"], "completed");
    assert_eq!(json["library"]["collected"]["sysName"], "edge-rtr");
}
