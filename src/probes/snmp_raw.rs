use regex::bytes::Regex;
use std::sync::OnceLock;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::error::ProbeError;
use crate::netutils::resolve_addr;
use crate::probes::snmp_codec::encode_get_request;
use crate::types::{ProbeTarget, SnmpProbeOutcome};

const RECV_BUF: usize = 4096;
const SNIPPET_FALLBACK_CHARS: usize = 200;

/// How a raw reply (or its absence) was read.
///
/// The classification never decodes the PDU. Runs are searched in the
/// printable projection, where masked bytes are themselves printable, so any
/// reply of four bytes or more yields `PrintableContent`. That is a weak signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawClassification {
    EchoesCommunity { snippet: String },
    PrintableContent { snippet: String },
    NoPrintable { received: usize },
    NoResponse,
    /// The request could not be encoded; nothing was sent.
    EncodeError(String),
    SocketError(String),
}

impl RawClassification {
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::EchoesCommunity { .. } | Self::PrintableContent { .. })
    }

    pub fn into_outcome(self, community: &str) -> SnmpProbeOutcome {
        let succeeded = self.is_positive();
        let detail = match self {
            Self::EchoesCommunity { snippet } => {
                format!("response contains community '{}'. Printable snippet: {}", community, snippet)
            }
            Self::PrintableContent { snippet } => {
                format!("response received (no community string visible): {}", snippet)
            }
            Self::NoPrintable { received } => {
                format!("received {} bytes but no printable content", received)
            }
            Self::NoResponse => "no response (timeout)".to_string(),
            Self::EncodeError(e) => e,
            Self::SocketError(e) => format!("socket error: {}", e),
        };
        SnmpProbeOutcome { succeeded, detail, collected: Default::default() }
    }
}

fn printable_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?-u)[\x20-\x7E]{4,}").expect("static regex"))
}

/// Printable ASCII kept, everything else replaced by `.`.
pub fn printable_projection(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
        .collect()
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Classify a datagram received in answer to the GetRequest.
pub fn classify_response(data: &[u8], community: &[u8]) -> RawClassification {
    let projection = printable_projection(data);
    let first_run = printable_runs()
        .find(projection.as_bytes())
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned());
    let has_run = first_run.is_some();
    let snippet = first_run.unwrap_or_else(|| projection.chars().take(SNIPPET_FALLBACK_CHARS).collect());

    if contains_subslice(data, community) {
        RawClassification::EchoesCommunity { snippet }
    } else if has_run {
        RawClassification::PrintableContent { snippet }
    } else {
        RawClassification::NoPrintable { received: data.len() }
    }
}

/// Single GetRequest exchange over UDP. Name resolution and the reply wait are
/// each bounded by the target timeout.
pub async fn exchange(target: &ProbeTarget, community: &str) -> RawClassification {
    let payload = match encode_get_request(community.as_bytes()) {
        Ok(p) => p,
        Err(e) => return RawClassification::EncodeError(ProbeError::from(e).to_string()),
    };

    let peer = match timeout(target.timeout, resolve_addr(&target.host, target.port)).await {
        Ok(Ok(sa)) => sa,
        Ok(Err(e)) => return RawClassification::SocketError(format!("cannot resolve {}: {}", target.host, e)),
        Err(_) => return RawClassification::SocketError(format!("resolving {} timed out", target.host)),
    };
    let bind_addr = if peer.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };

    let sock = match UdpSocket::bind(bind_addr).await {
        Ok(s) => s,
        Err(e) => return RawClassification::SocketError(e.to_string()),
    };

    if let Err(e) = sock.send_to(&payload, peer).await {
        return RawClassification::SocketError(e.to_string());
    }
    tracing::debug!(%peer, bytes = payload.len(), "raw SNMP GetRequest sent");

    let mut buf = vec![0u8; RECV_BUF];
    match timeout(target.timeout, sock.recv_from(&mut buf)).await {
        Ok(Ok((n, from))) => {
            buf.truncate(n);
            tracing::debug!(%from, bytes = n, "raw SNMP reply");
            classify_response(&buf, community.as_bytes())
        }
        Ok(Err(e)) => RawClassification::SocketError(e.to_string()),
        Err(_) => RawClassification::NoResponse,
    }
}

/// Fallback probe: hand-built SNMPv1 GetRequest and heuristic reading of the reply.
pub async fn probe_raw(target: &ProbeTarget, community: &str) -> SnmpProbeOutcome {
    exchange(target, community).await.into_outcome(community)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_masks_control_bytes() {
        assert_eq!(printable_projection(&[0x30, 0x00, b'a', 0x7F, b'~']), "0.a.~");
    }

    #[test]
    fn replies_under_four_bytes_are_negative() {
        let data = [0x04, b'a', 0x00];
        assert_eq!(classify_response(&data, b"public"), RawClassification::NoPrintable { received: 3 });
    }

    #[test]
    fn masked_bytes_join_runs() {
        let data = [0x04, b'a', b'b', b'c', 0x00, b'x', b'y', 0x01];
        assert_eq!(
            classify_response(&data, b"public"),
            RawClassification::PrintableContent { snippet: ".abc.xy.".to_string() }
        );
    }

    #[test]
    fn encode_error_is_not_a_socket_error() {
        let outcome = RawClassification::EncodeError("cannot encode SNMP request: too long".into()).into_outcome("x");
        assert!(!outcome.succeeded);
        assert_eq!(outcome.detail, "cannot encode SNMP request: too long");
    }
}
