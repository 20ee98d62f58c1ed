use serde::Deserialize;
use validator::Validate;
use crate::errors::AppError;
use crate::services::hash::HashStrategy;
use crate::validator::validate_repetitions;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct FilterConfig {
    #[validate(range(min = 1))]
    pub bit_count: usize,
    // one "std:<n>" hash function per entry, in order
    #[validate(length(min = 1), custom(function = "validate_repetitions"))]
    pub hash_repetitions: Vec<u32>,
}

impl FilterConfig {
    /// Builds the hash family through the signature registry, the same path a
    /// persisted record takes.
    ///
    /// # Errors
    /// Propagates [`AppError::InvalidParameter`] for a zero repetition count.
    pub fn hash_functions(&self) -> Result<Vec<HashStrategy>, AppError> {
        self.hash_repetitions
            .iter()
            .map(|reps| HashStrategy::from_signature(&format!("std:{}", reps)))
            .collect()
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            bit_count: 8,
            hash_repetitions: vec![1, 2],
        }
    }
}
