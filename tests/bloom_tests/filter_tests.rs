//! Tests for the Bloom Filter
//!
//! These tests verify:
//! - No false negatives
//! - Empty filters reject everything
//! - One-byte-per-bit serialization
//! - False positive rate on a roomy filter

use stratakv::bloom::{BloomFilter, BLOOM_BITS, BLOOM_HASHES};

// =============================================================================
// Membership Tests
// =============================================================================

#[test]
fn test_empty_filter_rejects_everything() {
    let filter = BloomFilter::default();

    for i in 0..100 {
        assert!(!filter.test(format!("key{}", i).as_bytes()));
    }
    assert_eq!(filter.count_ones(), 0);
}

#[test]
fn test_no_false_negatives_default_size() {
    let mut filter = BloomFilter::default();
    let keys: Vec<String> = (0..1000).map(|i| format!("key{:04}", i)).collect();

    for key in &keys {
        filter.add(key.as_bytes());
    }

    for key in &keys {
        assert!(filter.test(key.as_bytes()), "false negative for {}", key);
    }
}

#[test]
fn test_no_false_negatives_large_filter() {
    let mut filter = BloomFilter::new(4096, 7);
    for i in 0..500 {
        filter.add(format!("item-{}", i).as_bytes());
    }
    for i in 0..500 {
        assert!(filter.test(format!("item-{}", i).as_bytes()));
    }
}

#[test]
fn test_single_add_sets_k_distinct_bits() {
    let mut filter = BloomFilter::new(BLOOM_BITS, BLOOM_HASHES);

    filter.add(b"a");

    // 19 and 29 are coprime, so the 10 seeded probes land on distinct bits
    assert_eq!(filter.count_ones(), BLOOM_HASHES);
    assert!(filter.test(b"a"));
}

#[test]
fn test_false_positive_rate_is_bounded() {
    let mut filter = BloomFilter::new(10_000, 5);
    for i in 0..100 {
        filter.add(format!("member-{}", i).as_bytes());
    }

    let trials = 10_000;
    let false_positives = (0..trials)
        .filter(|i| filter.test(format!("stranger-{}", i).as_bytes()))
        .count();

    let rate = false_positives as f64 / trials as f64;
    assert!(rate < 0.05, "false positive rate too high: {}", rate);
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_to_bytes_is_one_byte_per_bit() {
    let mut filter = BloomFilter::default();
    filter.add(b"hello");
    filter.add(b"world");

    let bytes = filter.to_bytes();

    assert_eq!(bytes.len(), BLOOM_BITS);
    assert!(bytes.iter().all(|&b| b == 0x00 || b == 0x01));
    assert_eq!(
        bytes.iter().filter(|&&b| b == 0x01).count(),
        filter.count_ones()
    );
}

#[test]
fn test_from_bytes_reconstructs_filter() {
    let mut filter = BloomFilter::default();
    for key in ["cool", "testKey", "injustice", "soul", "zebra"] {
        filter.add(key.as_bytes());
    }

    let restored = BloomFilter::from_bytes(&filter.to_bytes(), BLOOM_HASHES);

    assert_eq!(restored, filter);
    for key in ["cool", "testKey", "injustice", "soul", "zebra"] {
        assert!(restored.test(key.as_bytes()));
    }
}

#[test]
fn test_from_bytes_treats_other_bytes_as_clear() {
    let bytes = [0x01, 0x02, 0xFF, 0x00, 0x01];

    let filter = BloomFilter::from_bytes(&bytes, 3);

    assert_eq!(filter.size(), 5);
    assert_eq!(filter.num_hashes(), 3);
    assert_eq!(filter.to_bytes(), vec![0x01, 0x00, 0x00, 0x00, 0x01]);
}
