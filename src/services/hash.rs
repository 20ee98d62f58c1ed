//! Hash family used by the Bloom filter.
//!
//! Strategies are addressed on disk by a `"<type>:<param>"` signature, so
//! every strategy must be stable across process runs and must rebuild from
//! its own signature byte for byte.

use std::fmt;
use std::str::FromStr;

use xxhash_rust::xxh3::xxh3_64;

use crate::errors::AppError;

const SIGNATURE_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    /// Base hash applied once, then re-applied to the decimal form of the
    /// previous result.
    Repeated,
}

impl HashKind {
    pub fn tag(&self) -> &'static str {
        match self {
            HashKind::Repeated => "std",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "std" => Some(HashKind::Repeated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashStrategy {
    Repeated { repetitions: u32 },
}

impl HashStrategy {
    /// # Errors
    /// Returns [`AppError::InvalidParameter`] when `repetitions` is zero.
    pub fn repeated(repetitions: u32) -> Result<Self, AppError> {
        if repetitions < 1 {
            return Err(AppError::InvalidParameter(format!(
                "hash repetition count must be >= 1, got {}",
                repetitions
            )));
        }
        Ok(HashStrategy::Repeated { repetitions })
    }

    /// Rebuilds a strategy from its persisted signature.
    ///
    /// The parameter must be written in canonical decimal form (no sign, no
    /// leading zeros) so that `signature()` reproduces the input exactly.
    ///
    /// # Errors
    /// [`AppError::InvalidSignature`] for a missing separator, a non-integer
    /// parameter or an unknown type; [`AppError::InvalidParameter`] for a zero
    /// repetition count.
    pub fn from_signature(signature: &str) -> Result<Self, AppError> {
        let (tag, param) = signature.split_once(SIGNATURE_SEPARATOR).ok_or_else(|| {
            AppError::InvalidSignature(format!("expected type:param, got {:?}", signature))
        })?;

        let value: u32 = param
            .parse()
            .ok()
            .filter(|v: &u32| v.to_string() == param)
            .ok_or_else(|| {
                AppError::InvalidSignature(format!("non-integer parameter in {:?}", signature))
            })?;

        match HashKind::from_tag(tag) {
            Some(HashKind::Repeated) => Self::repeated(value),
            None => Err(AppError::InvalidSignature(format!("unknown hash type: {:?}", tag))),
        }
    }

    pub fn kind(&self) -> HashKind {
        match self {
            HashStrategy::Repeated { .. } => HashKind::Repeated,
        }
    }

    pub fn signature(&self) -> String {
        match self {
            HashStrategy::Repeated { repetitions } => {
                format!("{}{}{}", self.kind().tag(), SIGNATURE_SEPARATOR, repetitions)
            }
        }
    }

    #[inline]
    pub fn hash(&self, item: &str) -> u64 {
        match *self {
            HashStrategy::Repeated { repetitions } => {
                let mut result = xxh3_64(item.as_bytes());
                let mut buf = itoa::Buffer::new();
                for _ in 1..repetitions {
                    result = xxh3_64(buf.format(result).as_bytes());
                }
                result
            }
        }
    }

    /// Bit position of `item` in an array of `bit_count` bits.
    #[inline]
    pub fn index(&self, item: &str, bit_count: usize) -> usize {
        (self.hash(item) % bit_count as u64) as usize
    }
}

impl fmt::Display for HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl FromStr for HashStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_signature(s)
    }
}
