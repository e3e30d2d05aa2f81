use std::collections::BTreeMap;

use crate::types::{LibraryProbe, ProbeTarget, SnmpProbeOutcome};

/// MIB-II system group scalars queried by the library path, in query order.
pub const SYSTEM_OIDS: [(&str, &str); 6] = [
    ("sysDescr", "1.3.6.1.2.1.1.1.0"),
    ("sysObjectID", "1.3.6.1.2.1.1.2.0"),
    ("sysUpTime", "1.3.6.1.2.1.1.3.0"),
    ("sysContact", "1.3.6.1.2.1.1.4.0"),
    ("sysName", "1.3.6.1.2.1.1.5.0"),
    ("sysLocation", "1.3.6.1.2.1.1.6.0"),
];

/// Extra attempts per OID after a receive timeout.
pub const RETRIES: usize = 1;

pub const NO_VALID_RESPONSES: &str = "no valid responses for standard OIDs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpCapability {
    Available,
    Unavailable(String),
}

/// Whether this build carries an SNMP client. Decided once per run.
pub fn detect_snmp_capability() -> SnmpCapability {
    if cfg!(feature = "snmp-client") {
        SnmpCapability::Available
    } else {
        SnmpCapability::Unavailable("built without the snmp-client feature".to_string())
    }
}

/// Build the outcome from whatever OIDs answered.
pub fn summarize(collected: BTreeMap<String, String>) -> SnmpProbeOutcome {
    if collected.is_empty() {
        return SnmpProbeOutcome::failure(NO_VALID_RESPONSES);
    }
    // report in query order rather than map order
    let lines: Vec<String> = SYSTEM_OIDS
        .iter()
        .filter_map(|(name, _)| collected.get(*name).map(|v| format!("{}: {}", name, v)))
        .collect();
    SnmpProbeOutcome {
        succeeded: true,
        detail: format!("SNMPv1 enumeration succeeded:\n{}", lines.join("\n")),
        collected,
    }
}

/// SNMPv1 GET of each system OID through the client library.
pub async fn probe_library(target: &ProbeTarget, community: &str, capability: &SnmpCapability) -> LibraryProbe {
    match capability {
        SnmpCapability::Unavailable(reason) => LibraryProbe::Unavailable { reason: reason.clone() },
        SnmpCapability::Available => LibraryProbe::Completed(run_gets(target, community).await),
    }
}

#[cfg(feature = "snmp-client")]
async fn run_gets(target: &ProbeTarget, community: &str) -> SnmpProbeOutcome {
    let mut collected = BTreeMap::new();
    for (name, oid) in SYSTEM_OIDS {
        match session::get_with_retry(target, community, oid).await {
            Ok(Some(value)) => {
                tracing::debug!(oid = name, %value, "snmp get answered");
                collected.insert(name.to_string(), value);
            }
            Ok(None) => tracing::debug!(oid = name, "snmp get returned no value"),
            Err(e) => tracing::debug!(oid = name, error = %e, "snmp get failed"),
        }
    }
    summarize(collected)
}

#[cfg(not(feature = "snmp-client"))]
async fn run_gets(_target: &ProbeTarget, _community: &str) -> SnmpProbeOutcome {
    summarize(BTreeMap::new())
}

#[cfg(feature = "snmp-client")]
mod session {
    use rand::Rng;
    use snmp2::{Oid, SyncSession, Value};
    use std::str::FromStr;

    use super::RETRIES;
    use crate::types::ProbeTarget;

    /// One GET, retried after a receive timeout. `Ok(None)` covers error-status
    /// replies and empty or exception varbinds.
    pub async fn get_with_retry(target: &ProbeTarget, community: &str, oid: &str) -> Result<Option<String>, String> {
        let addr = target.addr();
        let community = community.as_bytes().to_vec();
        let oid = oid.to_string();
        let timeout = target.timeout;

        tokio::task::spawn_blocking(move || {
            let oid_parsed = Oid::from_str(&oid).map_err(|_| format!("invalid OID: {}", oid))?;
            let req_id: i32 = rand::thread_rng().gen_range(1..=0x7fff_ffff);
            let mut session = SyncSession::new_v1(addr.as_str(), &community, Some(timeout), req_id)
                .map_err(|e| format!("session creation failed: {}", e))?;

            let mut attempt = 0usize;
            loop {
                match session.get(&oid_parsed) {
                    Ok(mut response) => {
                        if response.error_status != 0 {
                            return Ok(None);
                        }
                        return Ok(response.varbinds.next().and_then(|(_name, value)| render_value(value)));
                    }
                    Err(snmp2::Error::Receive) if attempt < RETRIES => attempt += 1,
                    Err(e) => return Err(format!("{:?}", e)),
                }
            }
        })
        .await
        .map_err(|e| format!("task join error: {}", e))?
    }

    fn render_value(value: Value) -> Option<String> {
        let rendered = match value {
            Value::Integer(i) => i.to_string(),
            Value::OctetString(s) => String::from_utf8_lossy(s).into_owned(),
            Value::ObjectIdentifier(oid) => oid.to_string(),
            Value::Timeticks(t) => t.to_string(),
            Value::Counter32(c) => c.to_string(),
            Value::Unsigned32(u) => u.to_string(),
            Value::Counter64(c) => c.to_string(),
            Value::IpAddress(ip) => format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => return None,
            other => format!("{:?}", other),
        };
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_in_query_order() {
        let mut collected = BTreeMap::new();
        collected.insert("sysName".to_string(), "core-sw1".to_string());
        collected.insert("sysDescr".to_string(), "Linux 6.1".to_string());
        let outcome = summarize(collected);
        assert!(outcome.succeeded);
        assert_eq!(outcome.detail, "SNMPv1 enumeration succeeded:\nsysDescr: Linux 6.1\nsysName: core-sw1");
        assert_eq!(outcome.collected.len(), 2);
    }

    #[test]
    fn empty_summary_is_negative() {
        let outcome = summarize(BTreeMap::new());
        assert!(!outcome.succeeded);
        assert_eq!(outcome.detail, NO_VALID_RESPONSES);
    }

    #[cfg(not(feature = "snmp-client"))]
    #[test]
    fn build_without_client_reports_unavailable() {
        assert!(matches!(detect_snmp_capability(), SnmpCapability::Unavailable(_)));
    }

    #[cfg(feature = "snmp-client")]
    #[test]
    fn build_with_client_reports_available() {
        assert_eq!(detect_snmp_capability(), SnmpCapability::Available);
    }

    #[tokio::test]
    async fn unavailable_capability_skips_library() {
        let target = ProbeTarget::new("127.0.0.1", 161, std::time::Duration::from_millis(100));
        let cap = SnmpCapability::Unavailable("no client".to_string());
        match probe_library(&target, "public", &cap).await {
            LibraryProbe::Unavailable { reason } => assert_eq!(reason, "no client"),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }
}
