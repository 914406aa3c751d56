//! postboard: server-rendered CRUD for posts, backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod state;
pub mod store;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, ConfigError};
pub use migration::{builtin as builtin_migrations, Migration, MigrationStatus, Migrator};
pub use model::{Page, Post, PostFields};
pub use routes::{api_routes, app, common_routes, post_routes};
pub use service::{PostService, RuleSet, ValidationErrors};
pub use state::AppState;
pub use store::{MemoryPostRepository, PgPostRepository, PostRepository};
pub use views::Views;
