//! Anonymous bind check for LDAP directories.
//!
//! The probe walks a fixed sequence: TCP gate, server descriptor, connection
//! (with optional StartTLS), anonymous bind, then a best-effort read of the
//! root DSE. Anything after a successful bind is recorded per field and never
//! turns the result into a failure.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry, SearchOptions};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::Probe;
use crate::error::ProbeError;
use crate::probes::helper::{describe_ldap_result, search_outcome};
use crate::probes::tcp::check_tcp;
use crate::types::{round_secs, AttributeMap, LdapMetadata, LdapProbeResult, ProbeTarget, ServerInfo};

const MATCH_ALL: &str = "(objectClass=*)";
const ROOT_DSE_ATTRS: [&str; 3] = ["namingContexts", "defaultNamingContext", "rootDomainNamingContext"];

pub struct LdapProbe {
    pub use_ldaps: bool,
    pub starttls: bool,
}

#[async_trait]
impl Probe for LdapProbe {
    type Report = LdapProbeResult;

    async fn probe(&self, target: &ProbeTarget) -> LdapProbeResult {
        try_anonymous_bind(&target.host, target.port, self.use_ldaps, self.starttls, target.timeout).await
    }

    fn default_port(&self) -> u16 {
        crate::netutils::default_ldap_port(self.use_ldaps)
    }

    fn name(&self) -> &'static str { "ldap" }
}

/// StartTLS over an LDAPS socket is meaningless; reject the pair before any I/O.
pub fn validate_options(use_ldaps: bool, starttls: bool) -> Result<(), ProbeError> {
    if use_ldaps && starttls {
        return Err(ProbeError::ConfigurationConflict(
            "Cannot use StartTLS when using LDAPS (use one or the other).".to_string(),
        ));
    }
    Ok(())
}

/// Where and how to reach the directory.
#[derive(Debug, Clone)]
pub struct ServerDescriptor {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    /// Read server discovery information after a successful bind.
    pub get_info: bool,
    pub connect_timeout: Duration,
}

impl ServerDescriptor {
    pub fn new(host: &str, port: u16, use_ssl: bool, get_info: bool, connect_timeout: Duration) -> Result<Self, ProbeError> {
        if host.is_empty() {
            return Err(ProbeError::ServerDescriptor("empty host".to_string()));
        }
        if host.chars().any(|c| c.is_whitespace() || c == '/' || c == '?' || c == '#') {
            return Err(ProbeError::ServerDescriptor(format!("invalid host '{}'", host)));
        }
        Ok(Self { host: host.to_string(), port, use_ssl, get_info, connect_timeout })
    }

    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        }
    }

    /// Certificates are not verified: the probe reports exposure, it does not
    /// authenticate the server.
    fn settings(&self, starttls: bool) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.connect_timeout)
            .set_starttls(starttls)
            .set_no_tls_verify(true)
    }
}

/// An open connection plus the task driving it.
struct Session {
    ldap: Ldap,
    driver: JoinHandle<()>,
}

impl Session {
    /// Open the connection; with `starttls` the StartTLS extended operation runs
    /// on the fresh plaintext connection before anything else is sent.
    async fn open(server: &ServerDescriptor, starttls: bool) -> Result<Self, ProbeError> {
        let url = server.url();
        let (conn, ldap) = match LdapConnAsync::with_settings(server.settings(starttls), &url).await {
            Ok(pair) => pair,
            Err(e @ LdapError::Io { .. }) => return Err(ProbeError::Open(e.to_string())),
            Err(e) if starttls => return Err(ProbeError::StartTls(e.to_string())),
            Err(e) => return Err(ProbeError::Open(e.to_string())),
        };
        let driver = tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::debug!(error = %e, "ldap connection closed with error");
            }
        });
        tracing::debug!(%url, starttls, "ldap connection open");
        Ok(Self { ldap, driver })
    }

    /// Unbind and stop the driver. Errors are irrelevant at this point.
    async fn close(mut self) {
        if let Err(e) = self.ldap.unbind().await {
            tracing::debug!(error = %e, "unbind failed");
        }
        self.driver.abort();
    }
}

fn attrs_to_map(attrs: HashMap<String, Vec<String>>) -> AttributeMap {
    attrs.into_iter().collect()
}

/// Full root DSE, used as server discovery information.
async fn fetch_server_info(ldap: &mut Ldap, server: &ServerDescriptor, timeout: Duration) -> Result<ServerInfo, String> {
    let summary = || ServerInfo::Summary {
        schema: "not discovered".to_string(),
        server_name: server.url(),
    };
    if !server.get_info {
        return Ok(summary());
    }
    let rs = ldap
        .with_timeout(timeout)
        .search("", Scope::Base, MATCH_ALL, vec!["*", "+"])
        .await
        .map_err(|e| e.to_string())?;
    match rs.0.into_iter().next() {
        Some(entry) => Ok(ServerInfo::Attributes(attrs_to_map(SearchEntry::construct(entry).attrs))),
        None => Ok(summary()),
    }
}

/// Root DSE naming attributes. Either `rootDSE` or `rootDSE_search_result` is set on success.
async fn read_root_dse(ldap: &mut Ldap, timeout: Duration, meta: &mut LdapMetadata) -> Result<(), String> {
    let rs = ldap
        .with_timeout(timeout)
        .search("", Scope::Base, MATCH_ALL, ROOT_DSE_ATTRS.to_vec())
        .await
        .map_err(|e| e.to_string())?;
    let (entries, res) = (rs.0, rs.1);
    match entries.into_iter().next() {
        Some(entry) => meta.root_dse = Some(attrs_to_map(SearchEntry::construct(entry).attrs)),
        None => meta.root_dse_search_result = Some(search_outcome(&res)),
    }
    Ok(())
}

/// Single-entry read of the first naming context.
async fn probe_sample_base(ldap: &mut Ldap, base: &str, timeout: Duration) -> Result<bool, String> {
    let rs = ldap
        .with_search_options(SearchOptions::new().sizelimit(1))
        .with_timeout(timeout)
        .search(base, Scope::Base, MATCH_ALL, vec!["objectClass"])
        .await
        .map_err(|e| e.to_string())?;
    Ok(!rs.0.is_empty())
}

/// Post-bind harvest. Each step records its own error and the next one still runs.
async fn harvest_metadata(ldap: &mut Ldap, server: &ServerDescriptor, timeout: Duration) -> LdapMetadata {
    let mut meta = LdapMetadata::default();

    match fetch_server_info(ldap, server, timeout).await {
        Ok(info) => meta.server_info = Some(info),
        Err(e) => meta.server_info_error = Some(e),
    }

    if let Err(e) = read_root_dse(ldap, timeout, &mut meta).await {
        meta.root_dse_error = Some(e);
    }

    match meta.naming_contexts().first().cloned() {
        Some(base) => match probe_sample_base(ldap, &base, timeout).await {
            Ok(found) => {
                meta.sample_base_found = Some(found);
                meta.sample_base = Some(base);
            }
            Err(e) => meta.sample_base_error = Some(e),
        },
        None => meta.naming_contexts_missing = Some(true),
    }

    meta
}

/// Anonymous bind on an open session, then metadata on success.
async fn bind_and_harvest(session: &mut Session, server: &ServerDescriptor, timeout: Duration, result: &mut LdapProbeResult) -> Result<(), ProbeError> {
    let res = session
        .ldap
        .with_timeout(timeout)
        .simple_bind("", "")
        .await
        .map_err(|e| ProbeError::Ldap(e.to_string()))?;

    if res.rc != 0 {
        tracing::info!(host = %server.host, rc = res.rc, "anonymous bind refused");
        result.success = false;
        result.error = Some(format!("Bind failed: {}", describe_ldap_result(&res)));
        return Ok(());
    }

    tracing::info!(host = %server.host, "anonymous bind accepted");
    result.success = true;
    result.metadata = harvest_metadata(&mut session.ldap, server, timeout).await;
    Ok(())
}

/// Check whether `host:port` accepts an anonymous LDAP bind.
pub async fn try_anonymous_bind(host: &str, port: u16, use_ldaps: bool, starttls: bool, timeout: Duration) -> LdapProbeResult {
    let start = Instant::now();
    let mut result = LdapProbeResult::new(host, port, use_ldaps, starttls);

    if let Err(e) = validate_options(use_ldaps, starttls) {
        result.error = Some(e.to_string());
        result.timings.total_s = Some(round_secs(start.elapsed()));
        return result;
    }

    match check_tcp(host, port, timeout).await {
        Ok(elapsed) => result.timings.tcp_connect_s = Some(round_secs(elapsed)),
        Err(e) => {
            tracing::info!(host, port, error = %e, "tcp gate closed");
            result.error = Some(format!("TCP connection failed: {}", e));
            result.timings.total_s = Some(round_secs(start.elapsed()));
            return result;
        }
    }

    let server = match ServerDescriptor::new(host, port, use_ldaps, true, timeout) {
        Ok(s) => s,
        Err(e) => {
            result.error = Some(e.to_string());
            result.timings.total_s = Some(round_secs(start.elapsed()));
            return result;
        }
    };

    let bind_start = Instant::now();
    match Session::open(&server, starttls).await {
        Ok(mut session) => {
            match bind_and_harvest(&mut session, &server, timeout, &mut result).await {
                Ok(()) => result.timings.bind_s = Some(round_secs(bind_start.elapsed())),
                Err(e) => result.error = Some(e.to_string()),
            }
            session.close().await;
        }
        Err(e) => {
            tracing::info!(host, port, error = %e, "ldap session not established");
            result.error = Some(e.to_string());
        }
    }

    result.timings.total_s = Some(round_secs(start.elapsed()));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_tls_options_rejected() {
        let err = validate_options(true, true).unwrap_err();
        assert!(matches!(err, ProbeError::ConfigurationConflict(_)));
        assert!(validate_options(true, false).is_ok());
        assert!(validate_options(false, true).is_ok());
    }

    #[test]
    fn descriptor_urls() {
        let t = Duration::from_secs(1);
        assert_eq!(ServerDescriptor::new("dc1.corp", 389, false, true, t).unwrap().url(), "ldap://dc1.corp:389");
        assert_eq!(ServerDescriptor::new("::1", 636, true, true, t).unwrap().url(), "ldaps://[::1]:636");
    }

    #[test]
    fn descriptor_rejects_bad_hosts() {
        let t = Duration::from_secs(1);
        assert!(ServerDescriptor::new("", 389, false, true, t).is_err());
        assert!(ServerDescriptor::new("evil host", 389, false, true, t).is_err());
        assert!(ServerDescriptor::new("a/b", 389, false, true, t).is_err());
    }
}
