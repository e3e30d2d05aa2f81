use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Attribute name to values, as returned for a single directory entry.
pub type AttributeMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self { host: host.into(), port, timeout }
    }

    /// `host:port`, bracketing bare IPv6 literals.
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Seconds rounded to four decimal places.
pub fn round_secs(d: Duration) -> f64 {
    (d.as_secs_f64() * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Timings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_connect_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_s: Option<f64>,
}

/// Discovery information about the directory server.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ServerInfo {
    Attributes(AttributeMap),
    Summary { schema: String, server_name: String },
}

/// The LDAPResult of a search that returned no entry.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchOutcome {
    pub result: u32,
    pub description: String,
    pub dn: String,
    pub message: String,
}

/// Post-bind harvest. Every field is absent unless its step produced it.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct LdapMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info_error: Option<String>,
    #[serde(rename = "rootDSE", skip_serializing_if = "Option::is_none")]
    pub root_dse: Option<AttributeMap>,
    #[serde(rename = "rootDSE_search_result", skip_serializing_if = "Option::is_none")]
    pub root_dse_search_result: Option<SearchOutcome>,
    #[serde(rename = "rootDSE_error", skip_serializing_if = "Option::is_none")]
    pub root_dse_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_base_found: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_base_error: Option<String>,
    #[serde(rename = "namingContexts_missing", skip_serializing_if = "Option::is_none")]
    pub naming_contexts_missing: Option<bool>,
}

impl LdapMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Values of `namingContexts` from the root DSE, if it was read.
    pub fn naming_contexts(&self) -> &[String] {
        self.root_dse
            .as_ref()
            .and_then(|attrs| attrs.get("namingContexts"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct LdapProbeResult {
    pub host: String,
    pub port: u16,
    pub use_ldaps: bool,
    pub starttls: bool,
    pub success: bool,
    pub error: Option<String>,
    pub metadata: LdapMetadata,
    pub timings: Timings,
}

impl LdapProbeResult {
    pub fn new(host: &str, port: u16, use_ldaps: bool, starttls: bool) -> Self {
        Self {
            host: host.to_string(),
            port,
            use_ldaps,
            starttls,
            success: false,
            error: None,
            metadata: LdapMetadata::default(),
            timings: Timings::default(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SnmpProbeOutcome {
    pub succeeded: bool,
    pub detail: String,
    /// OID name to rendered value; only filled by the library path.
    pub collected: BTreeMap<String, String>,
}

impl SnmpProbeOutcome {
    pub fn success(detail: impl Into<String>) -> Self {
        Self { succeeded: true, detail: detail.into(), collected: BTreeMap::new() }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self { succeeded: false, detail: detail.into(), collected: BTreeMap::new() }
    }
}

/// What the library-mediated SNMP attempt amounted to.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LibraryProbe {
    /// No SNMP client compiled in; the caller skips straight to the raw probe.
    Unavailable { reason: String },
    Completed(SnmpProbeOutcome),
}

#[derive(Debug, Serialize, Clone)]
pub struct SnmpCheckReport {
    pub target: String,
    pub port: u16,
    pub community: String,
    pub valid: bool,
    pub library: LibraryProbe,
    /// Present only when the fallback ran.
    pub raw: Option<SnmpProbeOutcome>,
    pub checked_at: DateTime<Utc>,
}

impl SnmpCheckReport {
    /// 0 when a community was confirmed by either path, 2 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.valid { 0 } else { 2 }
    }
}
