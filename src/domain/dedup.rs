//! Pair deduplication.
//!
//! A pair's identity is the (pair address, base address, quote address)
//! triple; the fingerprint is a SHA-256 over that triple. The same
//! fingerprint is used both for merging one cycle's multi-source results
//! and for the cross-cycle notified ledger.

use std::collections::{HashSet, VecDeque};

use sha2::{Digest, Sha256};

use super::pair::Pair;

pub type Fingerprint = [u8; 32];

/// Ledger size that triggers compaction.
pub const LEDGER_HIGH_WATER: usize = 2000;
/// Number of oldest entries dropped per compaction.
pub const LEDGER_EVICT_BATCH: usize = 1000;

/// Deterministic identity hash. Missing identity fields hash as empty
/// strings, so pairs missing all three collapse onto one fingerprint;
/// that collapse is deliberate and keeps fully-anonymous records from
/// flooding notifications.
pub fn fingerprint(pair: &Pair) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(pair.pair_address.as_bytes());
    hasher.update(b"-");
    hasher.update(pair.base_token.address.as_bytes());
    hasher.update(b"-");
    hasher.update(pair.quote_token.address.as_bytes());
    hasher.finalize().into()
}

/// Drop duplicate pairs from one cycle's merged multi-source haul,
/// keeping first occurrences in order.
pub fn merge_unique(pairs: Vec<Pair>) -> Vec<Pair> {
    let mut seen: HashSet<Fingerprint> = HashSet::with_capacity(pairs.len());
    pairs
        .into_iter()
        .filter(|pair| seen.insert(fingerprint(pair)))
        .collect()
}

/// Bounded set of fingerprints already notified on.
///
/// Grows until [`LEDGER_HIGH_WATER`], then sheds the oldest
/// [`LEDGER_EVICT_BATCH`] entries (insertion order, not LRU). Entirely
/// in-memory; a restart may re-notify, which is acceptable here.
#[derive(Debug)]
pub struct PairLedger {
    seen: HashSet<Fingerprint>,
    order: VecDeque<Fingerprint>,
    high_water: usize,
    evict_batch: usize,
}

impl PairLedger {
    pub fn new() -> Self {
        Self::with_limits(LEDGER_HIGH_WATER, LEDGER_EVICT_BATCH)
    }

    /// Custom bounds, mainly for tests.
    pub fn with_limits(high_water: usize, evict_batch: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            high_water,
            evict_batch,
        }
    }

    /// Record the pair and report whether it was unseen. Returns `true`
    /// exactly once per fingerprint until a compaction evicts it.
    pub fn is_new(&mut self, pair: &Pair) -> bool {
        let fp = fingerprint(pair);
        if !self.seen.insert(fp) {
            return false;
        }
        self.order.push_back(fp);
        self.compact();
        true
    }

    /// Evict the oldest batch once past the high-water mark. The entry
    /// inserted by the triggering call is the newest and always survives.
    fn compact(&mut self) {
        if self.order.len() <= self.high_water {
            return;
        }
        for _ in 0..self.evict_batch {
            match self.order.pop_front() {
                Some(fp) => {
                    self.seen.remove(&fp);
                }
                None => break,
            }
        }
        tracing::info!(remaining = self.order.len(), "compacted pair ledger");
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for PairLedger {
    fn default() -> Self {
        Self::new()
    }
}
