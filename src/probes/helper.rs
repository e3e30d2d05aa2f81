use ldap3::LdapResult;

use crate::types::SearchOutcome;

/// Map LDAP result codes to readable text.
pub fn ldap_result_text(code: u32) -> &'static str {
    match code {
        0 => "success",
        1 => "operationsError",
        2 => "protocolError",
        3 => "timeLimitExceeded",
        4 => "sizeLimitExceeded",
        7 => "authMethodNotSupported",
        8 => "strongAuthRequired",
        9 => "referralV2",
        10 => "referral",
        13 => "confidentialityRequired",
        16 => "noSuchAttribute",
        32 => "noSuchObject",
        48 => "inappropriateAuthentication",
        49 => "invalidCredentials",
        50 => "insufficientAccessRights",
        51 => "busy",
        52 => "unavailable",
        53 => "unwillingToPerform",
        68 => "entryAlreadyExists",
        80 => "other",
        _ => "unknown",
    }
}

/// Server diagnostic of an LDAPResult, kept verbatim.
pub fn describe_ldap_result(res: &LdapResult) -> String {
    format!(
        "result={} ({}), matched={:?}, message={:?}",
        res.rc,
        ldap_result_text(res.rc),
        res.matched,
        res.text
    )
}

pub fn search_outcome(res: &LdapResult) -> SearchOutcome {
    SearchOutcome {
        result: res.rc,
        description: ldap_result_text(res.rc).to_string(),
        dn: res.matched.clone(),
        message: res.text.clone(),
    }
}

pub fn push_line(out: &mut String, label: &str, value: &str) {
    if !out.is_empty() { out.push('\n'); }
    out.push_str(label);
    out.push_str(": ");
    out.push_str(value);
}
