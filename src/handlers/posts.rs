//! HTML resource handlers: index, create, store, show, edit, update, destroy.

use super::parse_id;
use crate::error::AppError;
use crate::model::Post;
use crate::state::AppState;
use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
}

/// Submitted post form. `_method` carries PUT/PATCH/DELETE for browsers that can only POST.
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "_method")]
    pub method: Option<String>,
}

impl PostForm {
    /// Submitted values as typed, for re-rendering a rejected form.
    fn old(&self) -> BTreeMap<String, String> {
        [("title", &self.title), ("body", &self.body)]
            .into_iter()
            .filter_map(|(k, v)| v.clone().map(|v| (k.to_string(), v)))
            .collect()
    }

    fn into_body(self) -> HashMap<String, Value> {
        [("title", self.title), ("body", self.body)]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::String(v))))
            .collect()
    }
}

fn notice_message(key: Option<&str>) -> Option<&'static str> {
    match key? {
        "created" => Some("Post created successfully."),
        "updated" => Some("Post updated successfully."),
        "deleted" => Some("Post deleted successfully."),
        _ => None,
    }
}

fn respond(state: &AppState, result: Result<Response, AppError>) -> Response {
    result.unwrap_or_else(|e| state.views.error_response(&e))
}

fn no_errors() -> BTreeMap<&'static str, Vec<&'static str>> {
    BTreeMap::new()
}

pub async fn home() -> Redirect {
    Redirect::to("/posts")
}

pub async fn index(State(state): State<AppState>, Query(q): Query<IndexQuery>) -> Response {
    let result = async {
        let page = q.page.as_deref().and_then(|p| p.trim().parse().ok()).unwrap_or(1);
        let page = state.posts.paginate(page, state.per_page).await?;
        state.views.page(
            StatusCode::OK,
            "posts/index.html",
            context! { page => page, notice => notice_message(q.notice.as_deref()) },
        )
    }
    .await;
    respond(&state, result)
}

pub async fn create(State(state): State<AppState>) -> Response {
    let result = state.views.page(
        StatusCode::OK,
        "posts/create.html",
        context! { old => BTreeMap::<&str, &str>::new(), errors => no_errors() },
    );
    respond(&state, result)
}

pub async fn store(State(state): State<AppState>, form: Result<Form<PostForm>, FormRejection>) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return respond(&state, Err(rejection.into())),
    };
    let old = form.old();
    let result = match state.posts.create(form.into_body()).await {
        Ok(post) => Ok(Redirect::to(&format!("/posts/{}?notice=created", post.id)).into_response()),
        Err(AppError::Validation(errs)) => state.views.page(
            StatusCode::UNPROCESSABLE_ENTITY,
            "posts/create.html",
            context! { old => old, errors => errs.messages() },
        ),
        Err(e) => Err(e),
    };
    respond(&state, result)
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<NoticeQuery>,
) -> Response {
    let result = async {
        let post = state.posts.find(parse_id(&id)?).await?;
        state.views.page(
            StatusCode::OK,
            "posts/show.html",
            context! { post => post, notice => notice_message(q.notice.as_deref()) },
        )
    }
    .await;
    respond(&state, result)
}

pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = async {
        let post = state.posts.find(parse_id(&id)?).await?;
        render_edit(&state, StatusCode::OK, &post, old_from_post(&post), no_errors())
    }
    .await;
    respond(&state, result)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Response {
    let result = match form {
        Ok(Form(form)) => apply_update(&state, &id, form).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond(&state, result)
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = apply_destroy(&state, &id).await;
    respond(&state, result)
}

/// `POST /posts/:id` with `_method` set to PUT, PATCH or DELETE.
pub async fn spoofed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return respond(&state, Err(rejection.into())),
    };
    let method = form.method.as_deref().unwrap_or_default().trim().to_ascii_uppercase();
    let result = match method.as_str() {
        "PUT" | "PATCH" => apply_update(&state, &id, form).await,
        "DELETE" => apply_destroy(&state, &id).await,
        other => Err(AppError::MethodNotAllowed(if other.is_empty() {
            "POST".to_string()
        } else {
            other.to_string()
        })),
    };
    respond(&state, result)
}

async fn apply_update(state: &AppState, id: &str, form: PostForm) -> Result<Response, AppError> {
    let id = parse_id(id)?;
    let old = form.old();
    match state.posts.update(id, form.into_body()).await {
        Ok(post) => Ok(Redirect::to(&format!("/posts/{}?notice=updated", post.id)).into_response()),
        Err(AppError::Validation(errs)) => {
            let post = state.posts.find(id).await?;
            render_edit(state, StatusCode::UNPROCESSABLE_ENTITY, &post, old, errs.messages())
        }
        Err(e) => Err(e),
    }
}

async fn apply_destroy(state: &AppState, id: &str) -> Result<Response, AppError> {
    state.posts.delete(parse_id(id)?).await?;
    Ok(Redirect::to("/posts?notice=deleted").into_response())
}

fn old_from_post(post: &Post) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("title".to_string(), post.title.clone()),
        ("body".to_string(), post.body.clone()),
    ])
}

fn render_edit<E: serde::Serialize>(
    state: &AppState,
    status: StatusCode,
    post: &Post,
    old: BTreeMap<String, String>,
    errors: E,
) -> Result<Response, AppError> {
    state.views.page(
        status,
        "posts/edit.html",
        context! { post => post, old => old, errors => errors },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_notice_is_ignored() {
        assert_eq!(notice_message(Some("created")), Some("Post created successfully."));
        assert_eq!(notice_message(Some("<script>")), None);
        assert_eq!(notice_message(None), None);
    }

    #[test]
    fn form_body_omits_absent_fields() {
        let form = PostForm {
            title: Some("t".into()),
            body: None,
            method: Some("PUT".into()),
        };
        let body = form.into_body();
        assert_eq!(body.len(), 1);
        assert_eq!(body["title"], Value::String("t".into()));
    }
}
