//! Bloom filter backed by an exact member set.
//!
//! INVARIANTS:
//! - Every bit produced by every hash function for every member is set, so
//!   `possibly_contains` never reports a false negative.
//! - `is_blacklisted` answers from the exact set, so it never reports a false
//!   positive.

use std::collections::BTreeSet;

use bitvec::prelude::*;

use crate::errors::AppError;
use crate::services::hash::HashStrategy;
use crate::types::Membership;

/// Full state of a filter, as produced by the record decoder and consumed by
/// [`BloomFilterCore::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub bit_count: usize,
    pub bits: BitVec<u8, Lsb0>,
    pub hash_functions: Vec<HashStrategy>,
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilterCore {
    bit_count: usize,
    bits: BitVec<u8, Lsb0>,
    hash_functions: Vec<HashStrategy>,
    members: BTreeSet<String>,
}

impl BloomFilterCore {
    /// Creates an empty filter of `bit_count` bits.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidConfiguration`] when `bit_count` is zero or
    /// no hash function is given.
    pub fn new(bit_count: usize, hash_functions: Vec<HashStrategy>) -> Result<Self, AppError> {
        if bit_count == 0 {
            return Err(AppError::InvalidConfiguration(
                "bit array size must be greater than zero".to_string(),
            ));
        }
        if hash_functions.is_empty() {
            return Err(AppError::InvalidConfiguration(
                "at least one hash function is required".to_string(),
            ));
        }
        Ok(Self {
            bit_count,
            bits: bitvec![u8, Lsb0; 0; bit_count],
            hash_functions,
            members: BTreeSet::new(),
        })
    }

    /// Builds a filter directly from a decoded record.
    ///
    /// # Errors
    /// Same conditions as [`BloomFilterCore::new`].
    pub fn from_state(state: FilterState) -> Result<Self, AppError> {
        let mut core = Self::new(state.bit_count, state.hash_functions.clone())?;
        core.reset(state)?;
        Ok(core)
    }

    /// Inserts `item`. Returns `true` if it was not already a member.
    pub fn add(&mut self, item: &str) -> bool {
        if !self.members.insert(item.to_string()) {
            return false;
        }
        self.set_bits(item);
        true
    }

    /// Removes `item` and rebuilds the bit array from the surviving members.
    ///
    /// Bits are shared between members, so none can be cleared individually.
    /// Returns `false` without touching any state when `item` is not a member.
    pub fn remove(&mut self, item: &str) -> bool {
        if !self.members.remove(item) {
            return false;
        }
        self.rebuild();
        true
    }

    pub fn possibly_contains(&self, item: &str) -> bool {
        self.hash_functions
            .iter()
            .all(|h| self.bits[h.index(item, self.bit_count)])
    }

    pub fn is_blacklisted(&self, item: &str) -> bool {
        self.possibly_contains(item) && self.members.contains(item)
    }

    /// Both flags of a `GET`, computed against one consistent state.
    pub fn query(&self, item: &str) -> Membership {
        let possibly_contained = self.possibly_contains(item);
        Membership {
            possibly_contained,
            blacklisted: possibly_contained && self.members.contains(item),
        }
    }

    /// Replaces every part of the filter. Only the load path calls this.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidConfiguration`] when `bits` does not hold
    /// exactly `bit_count` bits, `bit_count` is zero or no hash function is
    /// given. The filter is left untouched on error.
    pub fn reset(&mut self, state: FilterState) -> Result<(), AppError> {
        if state.bits.len() != state.bit_count {
            return Err(AppError::InvalidConfiguration(format!(
                "bit array holds {} bits but the filter size is {}",
                state.bits.len(),
                state.bit_count
            )));
        }
        if state.bit_count == 0 || state.hash_functions.is_empty() {
            return Err(AppError::InvalidConfiguration(
                "a filter needs a non-empty bit array and at least one hash function".to_string(),
            ));
        }
        self.bit_count = state.bit_count;
        self.bits = state.bits;
        self.hash_functions = state.hash_functions;
        self.members = state.members;
        Ok(())
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn bits(&self) -> &BitSlice<u8, Lsb0> {
        &self.bits
    }

    pub fn hash_functions(&self) -> &[HashStrategy] {
        &self.hash_functions
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether every member's bits are set in `bits`.
    pub fn covers_members(&self) -> bool {
        self.members.iter().all(|m| self.possibly_contains(m))
    }

    fn set_bits(&mut self, item: &str) {
        for h in &self.hash_functions {
            let idx = h.index(item, self.bit_count);
            self.bits.set(idx, true);
        }
    }

    fn rebuild(&mut self) {
        self.bits.fill(false);
        let members = std::mem::take(&mut self.members);
        for m in &members {
            self.set_bits(m);
        }
        self.members = members;
    }
}
