//! PostgreSQL-backed posts. Table layout comes from the `create_posts_table` migration.

use super::{not_found, PostRepository};
use crate::error::AppError;
use crate::model::{Post, PostFields};
use async_trait::async_trait;
use sqlx::PgPool;

const COLUMNS: &str = "id, title, body, created_at, updated_at";

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, fields: &PostFields) -> Result<Post, AppError> {
        let sql = format!("INSERT INTO posts (title, body) VALUES ($1, $2) RETURNING {}", COLUMNS);
        tracing::debug!(sql = %sql, "query");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&fields.title)
            .bind(&fields.body)
            .fetch_one(&self.pool)
            .await?;
        Ok(post)
    }

    async fn find(&self, id: i64) -> Result<Post, AppError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts ORDER BY id DESC", COLUMNS);
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_range(&self, limit: u32, offset: u32) -> Result<Vec<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts ORDER BY id DESC LIMIT $1 OFFSET $2", COLUMNS);
        tracing::debug!(sql = %sql, limit, offset, "query");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    async fn update(&self, id: i64, fields: &PostFields) -> Result<Post, AppError> {
        let sql = format!(
            "UPDATE posts SET title = $1, body = $2, updated_at = NOW() WHERE id = $3 RETURNING {}",
            COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        sqlx::query_as::<_, Post>(&sql)
            .bind(&fields.title)
            .bind(&fields.body)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        tracing::debug!(id, "delete post");
        let done = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
