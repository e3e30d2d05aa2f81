use async_trait::async_trait;
use chrono::Utc;

use super::Probe;
use crate::probes::snmp_lib::{probe_library, SnmpCapability};
use crate::probes::snmp_raw::probe_raw;
use crate::types::{LibraryProbe, ProbeTarget, SnmpCheckReport};

pub const DEFAULT_COMMUNITY: &str = "public";

/// SNMPv1 community check: library GETs first, raw GetRequest as fallback.
pub struct SnmpProbe {
    pub community: String,
    pub capability: SnmpCapability,
}

impl SnmpProbe {
    pub fn new(community: impl Into<String>, capability: SnmpCapability) -> Self {
        Self { community: community.into(), capability }
    }
}

#[async_trait]
impl Probe for SnmpProbe {
    type Report = SnmpCheckReport;

    async fn probe(&self, target: &ProbeTarget) -> SnmpCheckReport {
        check_community(target, &self.community, &self.capability).await
    }

    fn default_port(&self) -> u16 { 161 }
    fn name(&self) -> &'static str { "snmp" }
}

/// Run the library probe and, unless it confirmed the community, the raw probe.
pub async fn check_community(target: &ProbeTarget, community: &str, capability: &SnmpCapability) -> SnmpCheckReport {
    tracing::info!(host = %target.host, port = target.port, community, "testing SNMPv1 community");

    let library = probe_library(target, community, capability).await;
    let library_ok = matches!(&library, LibraryProbe::Completed(o) if o.succeeded);

    let raw = if library_ok {
        None
    } else {
        match &library {
            LibraryProbe::Unavailable { reason } => tracing::info!(%reason, "SNMP client unavailable, using raw UDP"),
            LibraryProbe::Completed(o) => tracing::info!(detail = %o.detail, "library probe negative, using raw UDP"),
        }
        Some(probe_raw(target, community).await)
    };

    let valid = library_ok || raw.as_ref().is_some_and(|o| o.succeeded);

    SnmpCheckReport {
        target: target.host.clone(),
        port: target.port,
        community: community.to_string(),
        valid,
        library,
        raw,
        checked_at: Utc::now(),
    }
}
