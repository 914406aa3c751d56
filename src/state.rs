//! Shared application state for all routes.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::service::PostService;
use crate::store::PostRepository;
use crate::views::Views;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub views: Arc<Views>,
    /// Page size for the HTML index.
    pub per_page: u32,
}

impl AppState {
    pub fn new(repo: Arc<dyn PostRepository>, config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            posts: PostService::new(repo),
            views: Arc::new(Views::new()?),
            per_page: config.per_page,
        })
    }
}
