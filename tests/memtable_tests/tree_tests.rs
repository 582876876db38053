//! Tests for the ordered index (red-black tree)
//!
//! These tests verify:
//! - Byte deltas returned by insert
//! - Point search
//! - In-order traversal
//! - Max-key offset computation

use stratakv::memtable::{max_offset, Pair, RedBlackTree};

// =============================================================================
// Insert Tests
// =============================================================================

#[test]
fn test_new_tree_is_empty() {
    let tree = RedBlackTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert!(tree.search(b"anything").is_none());
    assert_eq!(tree.iter().count(), 0);
}

#[test]
fn test_insert_new_key_returns_key_plus_value_len() {
    let mut tree = RedBlackTree::new();

    let delta = tree.insert(Pair::live(b"abc".to_vec(), b"12345".to_vec()));

    assert_eq!(delta, 8);
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_overwrite_returns_value_len_delta() {
    let mut tree = RedBlackTree::new();
    tree.insert(Pair::live(b"abc".to_vec(), b"12345".to_vec()));

    let shrink = tree.insert(Pair::live(b"abc".to_vec(), b"1".to_vec()));
    let grow = tree.insert(Pair::live(b"abc".to_vec(), b"123".to_vec()));

    assert_eq!(shrink, -4);
    assert_eq!(grow, 2);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.search(b"abc").unwrap().value, b"123".to_vec());
}

#[test]
fn test_tombstone_over_live_value() {
    let mut tree = RedBlackTree::new();
    tree.insert(Pair::live(b"key".to_vec(), b"value".to_vec()));

    let delta = tree.insert(Pair::tombstone(b"key".to_vec()));

    assert_eq!(delta, -5);
    let pair = tree.search(b"key").unwrap();
    assert!(!pair.live);
    assert!(pair.value.is_empty());
}

#[test]
fn test_new_tombstone_costs_key_len() {
    let mut tree = RedBlackTree::new();

    let delta = tree.insert(Pair::tombstone(b"gone".to_vec()));

    assert_eq!(delta, 4);
}

// =============================================================================
// Search / Traversal Tests
// =============================================================================

#[test]
fn test_search_finds_every_key() {
    let mut tree = RedBlackTree::new();
    for i in 0..200 {
        tree.insert(Pair::live(
            format!("key{}", i).into_bytes(),
            format!("value{}", i).into_bytes(),
        ));
    }

    for i in 0..200 {
        let pair = tree.search(format!("key{}", i).as_bytes()).unwrap();
        assert_eq!(pair.value, format!("value{}", i).into_bytes());
    }
    assert!(tree.search(b"key200").is_none());
    assert!(tree.search(b"").is_none());
}

#[test]
fn test_traverse_is_sorted_and_unique() {
    let mut tree = RedBlackTree::new();
    let keys = ["m", "c", "x", "a", "e", "z", "b", "m", "c"];
    for key in keys {
        tree.insert(Pair::live(key.as_bytes().to_vec(), b"v".to_vec()));
    }

    let traversed: Vec<Vec<u8>> = tree.traverse().into_iter().map(|p| p.key).collect();

    let expected: Vec<Vec<u8>> = ["a", "b", "c", "e", "m", "x", "z"]
        .iter()
        .map(|k| k.as_bytes().to_vec())
        .collect();
    assert_eq!(traversed, expected);
    assert_eq!(tree.len(), 7);
}

#[test]
fn test_iter_matches_traverse() {
    let mut tree = RedBlackTree::new();
    for i in (0..50).rev() {
        tree.insert(Pair::live(format!("{:03}", i).into_bytes(), Vec::new()));
    }

    let from_iter: Vec<Pair> = tree.iter().cloned().collect();

    assert_eq!(from_iter, tree.traverse());
    assert_eq!(from_iter.first().unwrap().key, b"000".to_vec());
    assert_eq!(from_iter.last().unwrap().key, b"049".to_vec());
}

#[test]
fn test_binary_keys_order_bytewise() {
    let mut tree = RedBlackTree::new();
    tree.insert(Pair::live(vec![0xFF], b"high".to_vec()));
    tree.insert(Pair::live(vec![0x00], b"low".to_vec()));
    tree.insert(Pair::live(vec![0x00, 0x00], b"lower-mid".to_vec()));

    let keys: Vec<Vec<u8>> = tree.iter().map(|p| p.key.clone()).collect();

    assert_eq!(keys, vec![vec![0x00], vec![0x00, 0x00], vec![0xFF]]);
}

#[test]
fn test_clear() {
    let mut tree = RedBlackTree::new();
    tree.insert(Pair::live(b"a".to_vec(), b"1".to_vec()));

    tree.clear();

    assert!(tree.is_empty());
    assert!(tree.search(b"a").is_none());
}

// =============================================================================
// Offset Tests
// =============================================================================

#[test]
fn test_encoded_len() {
    assert_eq!(Pair::live(b"a".to_vec(), b"1".to_vec()).encoded_len(), 7);
    assert_eq!(Pair::tombstone(b"b".to_vec()).encoded_len(), 4);
}

#[test]
fn test_max_offset_sums_all_but_last_record() {
    let pairs = vec![
        Pair::live(b"a".to_vec(), b"1".to_vec()), // 7 bytes
        Pair::tombstone(b"b".to_vec()),           // 4 bytes
        Pair::live(b"c".to_vec(), b"333".to_vec()),
    ];

    assert_eq!(max_offset(&pairs), 11);
}

#[test]
fn test_max_offset_edge_cases() {
    assert_eq!(max_offset(&[]), 0);
    assert_eq!(max_offset(&[Pair::live(b"only".to_vec(), b"one".to_vec())]), 0);
}
