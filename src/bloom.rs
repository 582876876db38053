//! Bloom Filter
//!
//! Probabilistic membership test embedded in every segment header.
//!
//! - If any probed bit is 0 → key is DEFINITELY NOT in the segment
//! - If all probed bits are 1 → key is PROBABLY in the segment
//!
//! Probe `i` is `(fnv1a32(key) + 19 * i) mod 2^32-1 mod size`: one base hash
//! perturbed by a small additive seed per function.
//!
//! ## Serialized Form
//! One byte per bit (`0x01` set, `0x00` clear), so the bitset can be copied
//! verbatim into a segment header and read back with [`BloomFilter::from_bytes`].

/// Bits in the filter written by segment format version 1
pub const BLOOM_BITS: usize = 29;

/// Hash functions used by segment format version 1
pub const BLOOM_HASHES: usize = 10;

/// Additive seed step between consecutive hash functions
const SEED_STEP: u64 = 19;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Fixed-size bloom filter with `k` seeded FNV-1a probes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: Vec<bool>,
    num_hashes: usize,
}

impl BloomFilter {
    /// Create an empty filter of `size` bits probed by `num_hashes` functions.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    pub fn new(size: usize, num_hashes: usize) -> Self {
        assert!(size > 0, "bloom filter size must be > 0");
        Self {
            bits: vec![false; size],
            num_hashes,
        }
    }

    /// Rebuild a filter from its one-byte-per-bit serialized form.
    ///
    /// Any byte other than `0x01` reads as a clear bit.
    pub fn from_bytes(bytes: &[u8], num_hashes: usize) -> Self {
        let mut filter = Self::new(bytes.len().max(1), num_hashes);
        for (bit, byte) in filter.bits.iter_mut().zip(bytes) {
            *bit = *byte == 0x01;
        }
        filter
    }

    /// Record an item
    pub fn add(&mut self, data: &[u8]) {
        let base = fnv1a32(data);
        for seed in 0..self.num_hashes {
            let index = self.probe(base, seed);
            self.bits[index] = true;
        }
    }

    /// `false` only if the item was definitely never added
    pub fn test(&self, data: &[u8]) -> bool {
        let base = fnv1a32(data);
        (0..self.num_hashes).all(|seed| self.bits[self.probe(base, seed)])
    }

    /// Serialize as one byte per bit
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.iter().map(|&set| u8::from(set)).collect()
    }

    /// Number of bits in the filter
    pub fn size(&self) -> usize {
        self.bits.len()
    }

    /// Number of hash functions probed per item
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Number of bits currently set
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&set| set).count()
    }

    fn probe(&self, base: u32, seed: usize) -> usize {
        let hash = (base as u64 + SEED_STEP * seed as u64) % u32::MAX as u64;
        (hash % self.bits.len() as u64) as usize
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new(BLOOM_BITS, BLOOM_HASHES)
    }
}

/// 32-bit FNV-1a
fn fnv1a32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ byte as u32).wrapping_mul(FNV_PRIME)
    })
}
