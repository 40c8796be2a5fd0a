pub mod applications;
pub mod candidates;
pub mod health;
pub mod recommendations;

use crate::error::ApiError;

const MAX_LIMIT: usize = 200;

/// `None` defers to the engine's default; zero is refused rather than
/// silently returning nothing.
pub(crate) fn checked_limit(limit: Option<usize>) -> Result<Option<usize>, ApiError> {
    match limit {
        Some(0) => Err(ApiError::BadRequest("limit must be at least 1".into())),
        Some(limit) => Ok(Some(limit.min(MAX_LIMIT))),
        None => Ok(None),
    }
}
