//! Tests for the tagged record codec
//!
//! These tests verify:
//! - Exact byte layout of set and delete records
//! - Decoding from concatenated buffers
//! - Rejection of truncated records and unknown tags
//! - Length limits on keys and values

use bytes::{Bytes, BytesMut};
use stratakv::memtable::Pair;
use stratakv::wal::{encode_delete, encode_pair, encode_set, Record, DELETE_TAG, SET_TAG};
use stratakv::StrataError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_set_record_layout() {
    let pair = Pair::live(b"ab".to_vec(), b"xyz".to_vec());
    let mut encoded = BytesMut::new();

    encode_set(&mut encoded, b"ab", b"xyz").unwrap();

    assert_eq!(&encoded[..], &[SET_TAG, 2, 0, b'a', b'b', 3, 0, b'x', b'y', b'z']);
    assert_eq!(pair.encoded_len(), encoded.len());
}

#[test]
fn test_delete_record_layout() {
    let mut encoded = BytesMut::new();

    encode_delete(&mut encoded, b"ab").unwrap();

    assert_eq!(&encoded[..], &[DELETE_TAG, 2, 0, b'a', b'b']);
    assert_eq!(Pair::tombstone(b"ab".to_vec()).encoded_len(), 5);
}

#[test]
fn test_length_prefix_is_little_endian() {
    let key = vec![b'k'; 300];
    let mut buf = BytesMut::new();

    encode_delete(&mut buf, &key).unwrap();

    // 300 = 0x012C
    assert_eq!(&buf[..3], &[b'd', 0x2C, 0x01]);
    assert_eq!(buf.len(), 303);
}

#[test]
fn test_encode_pair_matches_record() {
    let live = Pair::live(b"k".to_vec(), b"v".to_vec());
    let dead = Pair::tombstone(b"k".to_vec());
    let mut buf = BytesMut::new();

    encode_pair(&mut buf, &live).unwrap();
    encode_pair(&mut buf, &dead).unwrap();

    let mut expected = BytesMut::new();
    encode_set(&mut expected, b"k", b"v").unwrap();
    encode_delete(&mut expected, b"k").unwrap();
    assert_eq!(buf, expected);
}

#[test]
fn test_empty_value_is_allowed() {
    let mut buf = BytesMut::new();
    encode_set(&mut buf, b"k", b"").unwrap();

    let record = Record::decode(&mut buf.freeze()).unwrap().unwrap();

    assert_eq!(record, Record::Set { key: b"k".to_vec(), value: Vec::new() });
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_sequence_then_clean_end() {
    let mut buf = BytesMut::new();
    encode_set(&mut buf, b"a", b"1").unwrap();
    encode_delete(&mut buf, b"a").unwrap();
    encode_set(&mut buf, b"b", b"2").unwrap();
    let mut data = buf.freeze();

    let first = Record::decode(&mut data).unwrap().unwrap();
    let second = Record::decode(&mut data).unwrap().unwrap();
    let third = Record::decode(&mut data).unwrap().unwrap();

    assert_eq!(first, Record::Set { key: b"a".to_vec(), value: b"1".to_vec() });
    assert_eq!(second, Record::Delete { key: b"a".to_vec() });
    assert_eq!(third, Record::Set { key: b"b".to_vec(), value: b"2".to_vec() });
    assert!(Record::decode(&mut data).unwrap().is_none());
}

#[test]
fn test_decode_unknown_tag() {
    let mut data = Bytes::from_static(&[b'x', 1, 0, b'k']);

    let result = Record::decode(&mut data);

    assert!(matches!(result, Err(StrataError::MalformedEncoding(_))));
}

#[test]
fn test_decode_truncated_key() {
    let mut data = Bytes::from_static(&[b's', 5, 0, b'a', b'b']);

    let result = Record::decode(&mut data);

    assert!(matches!(result, Err(StrataError::MalformedEncoding(_))));
}

#[test]
fn test_decode_missing_value_prefix() {
    let mut data = Bytes::from_static(&[b's', 1, 0, b'a', 3]);

    let result = Record::decode(&mut data);

    assert!(matches!(result, Err(StrataError::MalformedEncoding(_))));
}

#[test]
fn test_decode_lone_tag() {
    let mut data = Bytes::from_static(&[b'd']);

    let result = Record::decode(&mut data);

    assert!(matches!(result, Err(StrataError::MalformedEncoding(_))));
}

#[test]
fn test_into_pair() {
    let set = Record::Set { key: b"k".to_vec(), value: b"v".to_vec() };
    let del = Record::Delete { key: b"k".to_vec() };

    assert_eq!(set.into_pair(), Pair::live(b"k".to_vec(), b"v".to_vec()));
    assert_eq!(del.into_pair(), Pair::tombstone(b"k".to_vec()));
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_max_length_key_accepted() {
    let key = vec![b'k'; 65_535];
    let mut buf = BytesMut::new();

    encode_set(&mut buf, &key, b"v").unwrap();

    let record = Record::decode(&mut buf.freeze()).unwrap().unwrap();
    assert_eq!(record.into_pair().key.len(), 65_535);
}

#[test]
fn test_oversized_key_rejected() {
    let key = vec![b'k'; 65_536];
    let mut buf = BytesMut::new();

    let result = encode_set(&mut buf, &key, b"v");

    assert!(matches!(
        result,
        Err(StrataError::EntryTooLarge { field: "key", len: 65_536 })
    ));
    assert!(buf.is_empty());
}

#[test]
fn test_oversized_value_rejected() {
    let value = vec![0u8; 70_000];
    let mut buf = BytesMut::new();

    let result = encode_set(&mut buf, b"k", &value);

    assert!(matches!(
        result,
        Err(StrataError::EntryTooLarge { field: "value", .. })
    ));
}
