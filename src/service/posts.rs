//! PostService: validates input, then hands it to the repository.

use super::validation::{normalize_input, RequestValidator, Rule, RuleSet};
use crate::error::AppError;
use crate::model::{last_page, Page, Post, PostFields};
use crate::store::PostRepository;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub const TITLE_MAX: usize = 255;
pub const MAX_PER_PAGE: u32 = 100;

/// Rules for both store and update.
pub fn post_rules() -> RuleSet {
    RuleSet::new()
        .field("title", [Rule::Required, Rule::String, Rule::Max(TITLE_MAX)])
        .field("body", [Rule::Required, Rule::String])
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    rules: Arc<RuleSet>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self::with_rules(repo, post_rules())
    }

    pub fn with_rules(repo: Arc<dyn PostRepository>, rules: RuleSet) -> Self {
        Self {
            repo,
            rules: Arc::new(rules),
        }
    }

    /// Normalize and validate a raw body; returns the writable fields.
    pub fn validate(&self, body: HashMap<String, Value>) -> Result<PostFields, AppError> {
        let body = normalize_input(body);
        RequestValidator::validate(&body, &self.rules)?;
        Ok(PostFields::from_validated(&body))
    }

    pub async fn create(&self, body: HashMap<String, Value>) -> Result<Post, AppError> {
        let fields = self.validate(body)?;
        let post = self.repo.create(&fields).await?;
        tracing::info!(id = post.id, "post created");
        Ok(post)
    }

    pub async fn find(&self, id: i64) -> Result<Post, AppError> {
        self.repo.find(id).await
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        self.repo.list().await
    }

    /// 1-based page; `per_page` is clamped to 1..=100. Pages past the end are empty.
    pub async fn paginate(&self, page: u32, per_page: u32) -> Result<Page<Post>, AppError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let total = self.repo.count().await?;
        let offset = (page - 1).saturating_mul(per_page);
        let items = if u64::from(offset) >= total {
            Vec::new()
        } else {
            self.repo.list_range(per_page, offset).await?
        };
        Ok(Page {
            items,
            page,
            per_page,
            total,
            last_page: last_page(total, per_page),
        })
    }

    /// `limit`/`offset` window plus the total row count.
    pub async fn window(&self, limit: u32, offset: u32) -> Result<(Vec<Post>, u64), AppError> {
        let total = self.repo.count().await?;
        let rows = self.repo.list_range(limit, offset).await?;
        Ok((rows, total))
    }

    /// A missing post wins over invalid input.
    pub async fn update(&self, id: i64, body: HashMap<String, Value>) -> Result<Post, AppError> {
        self.repo.find(id).await?;
        let fields = self.validate(body)?;
        let post = self.repo.update(id, &fields).await?;
        tracing::info!(id, "post updated");
        Ok(post)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete(id).await?;
        tracing::info!(id, "post deleted");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPostRepository;
    use serde_json::json;

    fn service() -> PostService {
        PostService::new(Arc::new(MemoryPostRepository::new()))
    }

    fn body(v: Value) -> HashMap<String, Value> {
        v.as_object().cloned().unwrap_or_default().into_iter().collect()
    }

    #[tokio::test]
    async fn created_post_is_retrievable_with_same_fields() {
        let svc = service();
        let created = svc.create(body(json!({"title": "Hello", "body": "World"}))).await.unwrap();
        let found = svc.find(created.id).await.unwrap();
        assert_eq!(found.title, "Hello");
        assert_eq!(found.body, "World");
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn missing_title_is_a_validation_error_naming_title() {
        let svc = service();
        let err = svc.create(body(json!({"body": "World"}))).await.unwrap_err();
        match err {
            AppError::Validation(errs) => {
                assert!(errs.has("title"));
                assert!(!errs.has("body"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_storing() {
        let svc = service();
        let p = svc.create(body(json!({"title": "  Spaced  ", "body": " text\n"}))).await.unwrap();
        assert_eq!(p.title, "Spaced");
        assert_eq!(p.body, "text");
    }

    #[tokio::test]
    async fn deleted_post_is_not_found() {
        let svc = service();
        let p = svc.create(body(json!({"title": "t", "body": "b"}))).await.unwrap();
        svc.delete(p.id).await.unwrap();
        assert!(matches!(svc.find(p.id).await.unwrap_err(), AppError::NotFound(_)));
        assert!(matches!(svc.delete(p.id).await.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_exactly_n() {
        let svc = service();
        for i in 0..7 {
            svc.create(body(json!({"title": format!("t{i}"), "body": "b"}))).await.unwrap();
        }
        assert_eq!(svc.list().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn update_revalidates_and_keeps_created_at() {
        let svc = service();
        let p = svc.create(body(json!({"title": "old", "body": "b"}))).await.unwrap();

        let err = svc.update(p.id, body(json!({"title": "", "body": "b"}))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.has("title")));

        let u = svc.update(p.id, body(json!({"title": "new", "body": "b2"}))).await.unwrap();
        assert_eq!(u.id, p.id);
        assert_eq!(u.title, "new");
        assert_eq!(u.created_at, p.created_at);
        assert!(u.updated_at >= p.updated_at);
    }

    #[tokio::test]
    async fn update_of_missing_post_is_not_found_even_with_bad_input() {
        let svc = service();
        let err = svc.update(42, body(json!({}))).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn paginate_clamps_and_reports_last_page() {
        let svc = service();
        for i in 0..12 {
            svc.create(body(json!({"title": format!("t{i}"), "body": "b"}))).await.unwrap();
        }
        let first = svc.paginate(0, 5).await.unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.items[0].title, "t11");
        assert_eq!(first.last_page, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = svc.paginate(3, 5).await.unwrap();
        assert_eq!(last.items.len(), 2);
        assert!(!last.has_next());

        assert!(svc.paginate(9, 5).await.unwrap().items.is_empty());
        assert_eq!(svc.paginate(1, 1000).await.unwrap().per_page, MAX_PER_PAGE);
    }
}
