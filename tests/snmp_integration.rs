#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use anonprobe::probes::snmp::check_community;
    use anonprobe::probes::snmp_lib::detect_snmp_capability;
    use anonprobe::types::ProbeTarget;

    // Integration test: requires a local SNMP agent on 127.0.0.1:161 (UDP) with community "public".
    // Run `docker run --rm -p 161:161/udp instrumentisto/snmpd` and set REAL_NET_TEST=1.
    #[tokio::test]
    async fn snmp_check_local_snmpd() {
        if env::var("REAL_NET_TEST").is_err() {
            eprintln!("Skipping real SNMP agent test. Set REAL_NET_TEST=1 to enable.");
            return;
        }
        let target = ProbeTarget::new("127.0.0.1", 161, Duration::from_millis(1000));
        let report = check_community(&target, "public", &detect_snmp_capability()).await;
        eprintln!("report: {:#?}", report);
        assert!(report.valid, "no valid response; ensure snmpd is running on 127.0.0.1:161");
        assert_eq!(report.exit_code(), 0);
    }
}
