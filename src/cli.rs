use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "anonprobe", about = "Detect anonymous LDAP binds and guessable SNMPv1 communities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check whether an LDAP server allows anonymous bind
    Ldap(LdapArgs),
    /// Check whether an SNMPv1 agent accepts a community string
    Snmp(SnmpArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct LdapArgs {
    /// LDAP host (hostname, host:port or ldap[s]://host). A scheme prefix is stripped.
    #[arg(short = 'H', long)]
    pub host: String,

    /// TCP port (defaults: 389 for ldap, 636 for ldaps)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Use LDAPS (TLS on connect)
    #[arg(long, action = ArgAction::SetTrue)]
    pub use_ldaps: bool,

    /// Upgrade the plaintext connection with StartTLS. Mutually exclusive with --use-ldaps
    #[arg(long, action = ArgAction::SetTrue)]
    pub starttls: bool,

    /// Timeout in seconds for connects and operations
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Print JSON only
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SnmpArgs {
    /// Target IP or hostname
    #[arg(short, long)]
    pub target: String,

    /// UDP port
    #[arg(short, long, default_value_t = 161)]
    pub port: u16,

    /// Community string
    #[arg(short, long, default_value = crate::probes::snmp::DEFAULT_COMMUNITY)]
    pub community: String,

    /// Timeout in seconds
    #[arg(short = 'T', long, default_value_t = 2)]
    pub timeout: u64,

    /// Print the report as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        Parser::parse()
    }
}
