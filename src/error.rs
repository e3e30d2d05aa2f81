//! Error taxonomy shared by the probes.
//!
//! Negative findings (a refused anonymous bind, an agent that ignores the
//! community) are not errors; they are reported through the result types.

use thiserror::Error;

use crate::probes::snmp_codec::CodecError;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// TCP or UDP transport failure, including timeouts and resolution errors.
    #[error("{0}")]
    Unreachable(String),

    /// Mutually exclusive options requested together; raised before any I/O.
    #[error("{0}")]
    ConfigurationConflict(String),

    #[error("Server object creation failed: {0}")]
    ServerDescriptor(String),

    #[error("Failed to open connection to server: {0}")]
    Open(String),

    #[error("StartTLS failed: {0}")]
    StartTls(String),

    #[error("Exception during LDAP operations: {0}")]
    Ldap(String),

    #[error("cannot encode SNMP request: {0}")]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starttls_error_display() {
        let err = ProbeError::StartTls("server refused extended operation".to_string());
        assert_eq!(err.to_string(), "StartTLS failed: server refused extended operation");
    }

    #[test]
    fn codec_error_converts() {
        let err: ProbeError = CodecError::LengthOverflow { field: "community", len: 200 }.into();
        assert!(matches!(err, ProbeError::Codec(_)));
        assert!(err.to_string().contains("community"));
    }
}
