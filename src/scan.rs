use anyhow::Result;
use colored::*;
use std::time::Duration;

use crate::cli::{Cli, Command, LdapArgs, SnmpArgs};
use crate::netutils::{normalize_host, split_host_port};
use crate::probes::helper::push_line;
use crate::probes::snmp_lib::detect_snmp_capability;
use crate::probes::{LdapProbe, Probe, SnmpProbe};
use crate::types::{LdapProbeResult, LibraryProbe, ProbeTarget, SnmpCheckReport};

/// Target for the LDAP probe: scheme stripped, `host:port` honoured, default
/// port picked from the TLS mode.
pub fn ldap_target(args: &LdapArgs) -> ProbeTarget {
    let (host, embedded_port) = split_host_port(normalize_host(&args.host));
    let probe = LdapProbe { use_ldaps: args.use_ldaps, starttls: args.starttls };
    let port = embedded_port.or(args.port).unwrap_or_else(|| probe.default_port());
    ProbeTarget::new(host, port, Duration::from_secs(args.timeout))
}

pub fn snmp_target(args: &SnmpArgs) -> ProbeTarget {
    ProbeTarget::new(args.target.as_str(), args.port, Duration::from_secs(args.timeout))
}

/// Human-readable LDAP report followed by the full JSON.
pub fn render_ldap_human(out: &LdapProbeResult) -> Result<String> {
    let status = if out.success { "ALLOWED".green().bold() } else { "NOT ALLOWED".red().bold() };
    let mut text = String::new();
    text.push_str(&format!("Anonymous LDAP bind: {}\n", status));
    text.push_str(&format!(
        "Host: {}:{}  LDAPS={}  StartTLS={}\n",
        out.host, out.port, out.use_ldaps, out.starttls
    ));
    if let Some(err) = &out.error {
        text.push_str(&format!("Error / details: {}\n", err));
    }
    text.push_str(&format!("Timings (s): {}\n", serde_json::to_string(&out.timings)?));

    let mut meta = String::new();
    let m = &out.metadata;
    if let Some(root) = &m.root_dse {
        push_line(&mut meta, " - rootDSE", &serde_json::to_string(root)?);
    }
    if let Some(info) = &m.server_info {
        push_line(&mut meta, " - server_info", &serde_json::to_string(info)?);
    }
    if let Some(base) = &m.sample_base {
        push_line(&mut meta, " - sample_base", base);
    }
    if let Some(found) = m.sample_base_found {
        push_line(&mut meta, " - sample_base_found", &found.to_string());
    }
    text.push_str("Metadata (partial):\n");
    if !meta.is_empty() {
        text.push_str(&meta);
        text.push('\n');
    }

    text.push_str("\nFull JSON output:\n");
    text.push_str(&serde_json::to_string_pretty(out)?);
    Ok(text)
}

pub fn render_snmp_human(report: &SnmpCheckReport) -> String {
    let mut text = format!(
        "[+] Testing SNMPv1 community '{}' on {}:{}\n",
        report.community, report.target, report.port
    );
    match &report.library {
        LibraryProbe::Completed(o) if o.succeeded => {
            text.push_str(&format!("{} Valid community string detected.\n{}\n", "[+]".green(), o.detail));
            return text;
        }
        LibraryProbe::Completed(o) => {
            text.push_str(&format!("{} library attempt failed: {}. Falling back to raw UDP.\n", "[-]".yellow(), o.detail));
        }
        LibraryProbe::Unavailable { reason } => {
            text.push_str(&format!("{} SNMP client not available ({}), falling back to raw UDP check.\n", "[!]".yellow(), reason));
        }
    }
    if let Some(raw) = &report.raw {
        if raw.succeeded {
            text.push_str(&format!("{} Raw UDP response received. {}\n", "[+]".green(), raw.detail));
        } else {
            text.push_str(&format!("{} No valid response. {}\n", "[-]".red(), raw.detail));
        }
    }
    text
}

/// Run the selected probe, print its report and return the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Ldap(args) => {
            let target = ldap_target(&args);
            let probe = LdapProbe { use_ldaps: args.use_ldaps, starttls: args.starttls };
            tracing::debug!(probe = probe.name(), host = %target.host, port = target.port, "starting");
            let out = probe.probe(&target).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", render_ldap_human(&out)?);
            }
            // callers read `success` from the output rather than the exit code
            Ok(0)
        }
        Command::Snmp(args) => {
            let target = snmp_target(&args);
            let probe = SnmpProbe::new(args.community.clone(), detect_snmp_capability());
            tracing::debug!(probe = probe.name(), host = %target.host, port = target.port, "starting");
            let report = probe.probe(&target).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_snmp_human(&report));
            }
            Ok(report.exit_code())
        }
    }
}
