pub mod tcp;
pub mod helper;
pub mod ldap;
pub mod snmp;
pub mod snmp_codec;
pub mod snmp_lib;
pub mod snmp_raw;
pub use tcp::check_tcp;
pub use ldap::{try_anonymous_bind, LdapProbe};
pub use snmp::{check_community, SnmpProbe};
use async_trait::async_trait;
use serde::Serialize;

use crate::types::ProbeTarget;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Structured result, always produced; failures are described inside it.
    type Report: Serialize + Send;

    async fn probe(&self, target: &ProbeTarget) -> Self::Report;
    /// Port used when the caller gave none
    fn default_port(&self) -> u16;
    /// Human name for logging
    fn name(&self) -> &'static str { "generic" }
}
