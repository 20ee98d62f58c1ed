use once_cell::sync::Lazy;
use regex::Regex;
use ::validator::ValidationError;

use crate::services::hash::HashStrategy;

const MAX_URL_LENGTH: usize = 2048;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((https?://)?(www\.)?([a-zA-Z0-9-]+\.)+[a-zA-Z0-9]{2,})(/\S*)?$")
        .expect("URL pattern is valid")
});

/// Checks the shape of a blacklist item.
///
/// Commas are refused because they separate members in the persisted record.
///
/// # Errors
/// Returns a [`ValidationError`] coded `url_too_long`, `reserved_separator`
/// or `invalid_url_format`.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.len() > MAX_URL_LENGTH {
        let mut err = ValidationError::new("url_too_long");
        err.add_param("max_length".into(), &MAX_URL_LENGTH);
        return Err(err);
    }
    if url.contains(',') {
        let mut err = ValidationError::new("reserved_separator");
        err.add_param("url".into(), &url);
        return Err(err);
    }
    if !URL_REGEX.is_match(url) {
        let mut err = ValidationError::new("invalid_url_format");
        err.add_param("url".into(), &url);
        return Err(err);
    }
    Ok(())
}

/// Every configured repetition count must build a hash strategy.
pub fn validate_repetitions(repetitions: &Vec<u32>) -> Result<(), ValidationError> {
    for &reps in repetitions {
        if HashStrategy::repeated(reps).is_err() {
            let mut err = ValidationError::new("invalid_hash_repetitions");
            err.add_param("value".into(), &reps);
            return Err(err);
        }
    }
    Ok(())
}
