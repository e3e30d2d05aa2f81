// tests/snmp_codec.rs
use anonprobe::probes::snmp_codec::{encode_get_request, max_community_len, CodecError, GET_REQUEST_TAIL};

#[test]
fn length_bytes_track_community_length() {
    for n in [0usize, 1, 6, 32, 64, max_community_len()] {
        let community = vec![b'c'; n];
        let pkt = encode_get_request(&community).unwrap();

        // version (3) + community header (2) + community + PDU tag/len (2) + PDU body (28)
        assert_eq!(pkt[1] as usize, 3 + 2 + n + 2 + 28, "outer length for n={}", n);
        assert_eq!(pkt[1] as usize, pkt.len() - 2);
        assert_eq!(pkt[0], 0x30);
        assert_eq!(&pkt[2..5], &[0x02, 0x01, 0x00]);
        assert_eq!(pkt[5], 0x04);
        assert_eq!(pkt[6] as usize, n);
        assert_eq!(&pkt[7..7 + n], community.as_slice());
        assert_eq!(&pkt[7 + n..], &GET_REQUEST_TAIL);
    }
}

#[test]
fn fixed_tail_is_reproduced_exactly() {
    let expected: [u8; 30] = [
        0xA0, 0x1C, 0x02, 0x04, 0x0E, 0xB3, 0x76, 0xF4, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x0E,
        0x30, 0x0C, 0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x05, 0x00, 0x05, 0x00,
    ];
    assert_eq!(GET_REQUEST_TAIL, expected);
}

#[test]
fn community_of_128_bytes_is_rejected() {
    let err = encode_get_request(&[b'x'; 128]).unwrap_err();
    assert_eq!(err, CodecError::LengthOverflow { field: "community", len: 128 });
}

#[test]
fn message_overflow_is_rejected_not_truncated() {
    // community fits its own length byte but the whole message does not
    let n = max_community_len() + 1;
    let err = encode_get_request(&vec![b'x'; n]).unwrap_err();
    assert_eq!(err, CodecError::LengthOverflow { field: "message", len: 128 });
}

#[test]
fn largest_encodable_community() {
    assert_eq!(max_community_len(), 92);
    let pkt = encode_get_request(&[b'x'; 92]).unwrap();
    assert_eq!(pkt[1], 0x7F);
}
