//! In-process posts store with the same semantics as the PostgreSQL one.

use super::{not_found, PostRepository};
use crate::error::AppError;
use crate::model::{Post, PostFields};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i64, Post>,
    // last issued id; ids are never handed out twice
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryPostRepository {
    inner: RwLock<Inner>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, fields: &PostFields) -> Result<Post, AppError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let now = Utc::now();
        let post = Post {
            id: inner.last_id,
            title: fields.title.clone(),
            body: fields.body.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(post.id, post.clone());
        tracing::debug!(id = post.id, "memory insert");
        Ok(post)
    }

    async fn find(&self, id: i64) -> Result<Post, AppError> {
        self.inner.read().await.rows.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.inner.read().await.rows.values().rev().cloned().collect())
    }

    async fn list_range(&self, limit: u32, offset: u32) -> Result<Vec<Post>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .rows
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.inner.read().await.rows.len() as u64)
    }

    async fn update(&self, id: i64, fields: &PostFields) -> Result<Post, AppError> {
        let mut inner = self.inner.write().await;
        let post = inner.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        post.title = fields.title.clone();
        post.body = fields.body.clone();
        post.updated_at = Utc::now().max(post.created_at);
        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
