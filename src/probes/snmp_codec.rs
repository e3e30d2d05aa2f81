//! Minimal BER encoder for the raw SNMPv1 GetRequest used by the UDP fallback.
//!
//! Only short-form (single byte) lengths are produced. The PDU after the
//! community string is a fixed byte sequence: request-id `0x0EB376F4`,
//! error-status 0, error-index 0 and one varbind `1.3.6.1.2.1.1.5.0 = NULL`.
//! Agents answer it with their system name, or with `noSuchName` when the
//! community is accepted but the view hides the object; either reply is enough
//! for the heuristic in `snmp_raw`.

use thiserror::Error;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;

/// Largest length a single short-form length byte can carry.
pub const MAX_SHORT_LEN: usize = 0x7F;

/// `version INTEGER 0`
const VERSION_V1: [u8; 3] = [TAG_INTEGER, 0x01, 0x00];

/// GetRequest-PDU, tag and length included. The PDU's own content is 0x1C bytes.
pub const GET_REQUEST_TAIL: [u8; 30] = [
    0xA0, 0x1C, // GetRequest-PDU, 28 content bytes
    0x02, 0x04, 0x0E, 0xB3, 0x76, 0xF4, // request-id
    0x02, 0x01, 0x00, // error-status
    0x02, 0x01, 0x00, // error-index
    0x30, 0x0E, // VarBindList
    0x30, 0x0C, // VarBind
    0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x05, 0x00, // name
    0x05, 0x00, // value NULL
];

/// Request-id embedded in `GET_REQUEST_TAIL`.
pub const REQUEST_ID: u32 = 0x0EB3_76F4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A length does not fit the single-byte BER length form.
    #[error("{field} length {len} exceeds the single-byte BER limit of 127")]
    LengthOverflow { field: &'static str, len: usize },
}

/// Encode the GetRequest for `community`.
///
/// Fails instead of emitting a truncated length byte once the community or the
/// whole message content reaches 128 bytes.
pub fn encode_get_request(community: &[u8]) -> Result<Vec<u8>, CodecError> {
    if community.len() > MAX_SHORT_LEN {
        return Err(CodecError::LengthOverflow { field: "community", len: community.len() });
    }

    let mut inner = Vec::with_capacity(VERSION_V1.len() + 2 + community.len() + GET_REQUEST_TAIL.len());
    inner.extend_from_slice(&VERSION_V1);
    inner.push(TAG_OCTET_STRING);
    inner.push(community.len() as u8);
    inner.extend_from_slice(community);
    inner.extend_from_slice(&GET_REQUEST_TAIL);

    if inner.len() > MAX_SHORT_LEN {
        return Err(CodecError::LengthOverflow { field: "message", len: inner.len() });
    }

    let mut msg = Vec::with_capacity(2 + inner.len());
    msg.push(TAG_SEQUENCE);
    msg.push(inner.len() as u8);
    msg.extend_from_slice(&inner);
    Ok(msg)
}

/// Longest community that still yields a short-form message length.
pub const fn max_community_len() -> usize {
    MAX_SHORT_LEN - VERSION_V1.len() - 2 - GET_REQUEST_TAIL.len()
}
