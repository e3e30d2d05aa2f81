use std::io;
use std::net::{IpAddr, SocketAddr};

/// Strip an `ldap://` or `ldaps://` prefix, keeping host and optional port.
pub fn normalize_host(host: &str) -> &str {
    for scheme in ["ldap://", "ldaps://"] {
        if let Some(rest) = host.strip_prefix(scheme) {
            return rest;
        }
    }
    host
}

/// Split `host:port` when there is exactly one colon and a numeric suffix.
/// Bracketed or bare IPv6 literals are left untouched.
pub fn split_host_port(raw: &str) -> (&str, Option<u16>) {
    if raw.starts_with('[') || raw.matches(':').count() != 1 {
        return (raw, None);
    }
    match raw.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            match port.parse::<u16>() {
                Ok(p) => (host, Some(p)),
                Err(_) => (raw, None),
            }
        }
        _ => (raw, None),
    }
}

pub fn default_ldap_port(use_ldaps: bool) -> u16 {
    if use_ldaps { 636 } else { 389 }
}

/// Resolve `host` to the first socket address. IP literals skip the resolver.
pub async fn resolve_addr(host: &str, port: u16) -> io::Result<SocketAddr> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {}", host)))
}
