//! PostService: validated CRUD over a `PostRepository`.

mod posts;
mod validation;
pub use posts::{post_rules, PostService, MAX_PER_PAGE, TITLE_MAX};
pub use validation::{normalize_input, RequestValidator, Rule, RuleSet, ValidationErrors, Violation};
