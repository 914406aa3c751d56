//! Post persistence. `PostRepository` is the seam; PostgreSQL and memory backends implement it.

mod memory;
mod postgres;

pub use memory::MemoryPostRepository;
pub use postgres::PgPostRepository;

use crate::error::AppError;
use crate::model::{Post, PostFields};
use async_trait::async_trait;

/// Storage for posts. Inputs are already validated; a missing id is `AppError::NotFound`.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, fields: &PostFields) -> Result<Post, AppError>;

    async fn find(&self, id: i64) -> Result<Post, AppError>;

    /// Every post, newest first.
    async fn list(&self) -> Result<Vec<Post>, AppError>;

    /// A window of `list()`.
    async fn list_range(&self, limit: u32, offset: u32) -> Result<Vec<Post>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    /// Replace title and body, refresh `updated_at`.
    async fn update(&self, id: i64, fields: &PostFields) -> Result<Post, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Liveness check behind `/ready`.
    async fn ping(&self) -> Result<(), AppError>;
}

pub(crate) fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("post {}", id))
}
