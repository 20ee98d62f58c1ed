//! Four-line text record holding a complete filter snapshot.
//!
//! ```text
//! ArraySize: 8
//! BitArray: 01000100
//! HashList: std:1,std:2
//! Blacklist: www.example.com0
//! ```

use std::collections::BTreeSet;

use bitvec::prelude::*;

use super::filter::{BloomFilterCore, FilterState};
use crate::errors::AppError;
use crate::services::hash::HashStrategy;

pub const ARRAY_SIZE_PREFIX: &str = "ArraySize: ";
pub const BIT_ARRAY_PREFIX: &str = "BitArray: ";
pub const HASH_LIST_PREFIX: &str = "HashList: ";
pub const BLACKLIST_PREFIX: &str = "Blacklist: ";

const LIST_SEPARATOR: char = ',';

/// Renders the record for `core`. Each line ends with `\n`.
pub fn encode(core: &BloomFilterCore) -> String {
    let bits: String = core
        .bits()
        .iter()
        .map(|bit| if *bit { '1' } else { '0' })
        .collect();
    let hashes = core
        .hash_functions()
        .iter()
        .map(HashStrategy::signature)
        .collect::<Vec<_>>()
        .join(",");
    let members = core.members().collect::<Vec<_>>().join(",");

    let mut out = String::with_capacity(bits.len() + hashes.len() + members.len() + 64);
    out.push_str(ARRAY_SIZE_PREFIX);
    out.push_str(itoa::Buffer::new().format(core.bit_count()));
    out.push('\n');
    out.push_str(BIT_ARRAY_PREFIX);
    out.push_str(&bits);
    out.push('\n');
    out.push_str(HASH_LIST_PREFIX);
    out.push_str(&hashes);
    out.push('\n');
    out.push_str(BLACKLIST_PREFIX);
    out.push_str(&members);
    out.push('\n');
    out
}

/// Parses a record into a full reset payload.
///
/// # Errors
/// Returns [`AppError::MalformedRecord`] when a line or its prefix is missing,
/// the size is not a positive integer, the bit string holds anything but `0`
/// and `1` or disagrees with the size, a signature is invalid, the hash list
/// is empty, extra content follows the four lines, or a member is not covered
/// by the stored bits.
pub fn decode(text: &str) -> Result<FilterState, AppError> {
    let mut lines = text.lines().map(|l| l.strip_suffix('\r').unwrap_or(l));

    let size_field = field(lines.next(), ARRAY_SIZE_PREFIX)?;
    let bit_count: usize = size_field
        .trim()
        .parse()
        .map_err(|_| malformed(format!("ArraySize is not an integer: {:?}", size_field)))?;
    if bit_count == 0 {
        return Err(malformed("ArraySize must be greater than zero"));
    }

    let bit_field = field(lines.next(), BIT_ARRAY_PREFIX)?;
    let mut bits: BitVec<u8, Lsb0> = BitVec::with_capacity(bit_field.len());
    for c in bit_field.chars() {
        match c {
            '1' => bits.push(true),
            '0' => bits.push(false),
            other => return Err(malformed(format!("invalid character in BitArray: {:?}", other))),
        }
    }
    if bits.len() != bit_count {
        return Err(malformed(format!(
            "BitArray holds {} bits but ArraySize is {}",
            bits.len(),
            bit_count
        )));
    }

    let hash_field = field(lines.next(), HASH_LIST_PREFIX)?;
    let hash_functions = split_list(hash_field)
        .map(|sig| {
            HashStrategy::from_signature(sig)
                .map_err(|e| malformed(format!("bad hash signature {:?}: {}", sig, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if hash_functions.is_empty() {
        return Err(malformed("HashList is empty"));
    }

    let members_field = field(lines.next(), BLACKLIST_PREFIX)?;
    let members: BTreeSet<String> = split_list(members_field).map(str::to_string).collect();

    if lines.any(|l| !l.trim().is_empty()) {
        return Err(malformed("unexpected content after Blacklist line"));
    }

    let state = FilterState { bit_count, bits, hash_functions, members };
    let core = BloomFilterCore::from_state(state.clone())?;
    if !core.covers_members() {
        return Err(malformed("BitArray does not cover every blacklisted item"));
    }
    Ok(state)
}

fn field<'a>(line: Option<&'a str>, prefix: &str) -> Result<&'a str, AppError> {
    let line = line.ok_or_else(|| malformed(format!("missing {:?} line", prefix.trim_end())))?;
    line.strip_prefix(prefix)
        .ok_or_else(|| malformed(format!("expected line starting with {:?}", prefix)))
}

fn split_list(field: &str) -> impl Iterator<Item = &str> {
    field.split(LIST_SEPARATOR).filter(|s| !s.is_empty())
}

fn malformed(msg: impl Into<String>) -> AppError {
    AppError::MalformedRecord(msg.into())
}
