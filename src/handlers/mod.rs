//! HTTP handlers: HTML pages for posts and the JSON API.

pub mod api;
pub mod posts;

use crate::error::AppError;

/// Ids are positive integers; anything else names no post.
pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(format!("post {}", raw)))
}
