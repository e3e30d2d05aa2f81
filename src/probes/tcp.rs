use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::ProbeError;
use crate::netutils::resolve_addr;

/// Open and immediately close a TCP connection, returning how long the dial took.
///
/// Resolution failures, refusals and timeouts come back as distinct
/// `ProbeError::Unreachable` reasons.
pub async fn check_tcp(host: &str, port: u16, timeout_dur: Duration) -> Result<Duration, ProbeError> {
    let start = Instant::now();

    let socket = match timeout(timeout_dur, resolve_addr(host, port)).await {
        Ok(Ok(sa)) => sa,
        Ok(Err(e)) => return Err(ProbeError::Unreachable(format!("cannot resolve {}: {}", host, e))),
        Err(_) => return Err(ProbeError::Unreachable(format!("resolving {} timed out", host))),
    };

    let remaining = timeout_dur.saturating_sub(start.elapsed());
    match timeout(remaining, TcpStream::connect(socket)).await {
        Ok(Ok(stream)) => {
            let elapsed = start.elapsed();
            drop(stream);
            tracing::debug!(%socket, ?elapsed, "tcp gate open");
            Ok(elapsed)
        }
        Ok(Err(e)) => Err(ProbeError::Unreachable(format!("{} ({})", e, socket))),
        Err(_) => Err(ProbeError::Unreachable(format!(
            "timed out after {:.1}s ({})",
            timeout_dur.as_secs_f64(),
            socket
        ))),
    }
}
