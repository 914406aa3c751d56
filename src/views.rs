//! HTML rendering with minijinja. Templates are compiled into the binary.

use crate::error::AppError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Environment};
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("posts/index.html", include_str!("../templates/posts/index.html")),
    ("posts/show.html", include_str!("../templates/posts/show.html")),
    ("posts/create.html", include_str!("../templates/posts/create.html")),
    ("posts/edit.html", include_str!("../templates/posts/edit.html")),
    ("posts/_form.html", include_str!("../templates/posts/_form.html")),
];

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_filter("datetime", datetime);
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, AppError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    pub fn page<S: Serialize>(&self, status: StatusCode, name: &str, ctx: S) -> Result<Response, AppError> {
        Ok((status, Html(self.render(name, ctx)?)).into_response())
    }

    /// Error page for `err`. Falls back to plain text if the page itself fails to render.
    pub fn error_response(&self, err: &AppError) -> Response {
        let (status, code) = err.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        let ctx = context! {
            status => status.as_u16(),
            reason => status.canonical_reason().unwrap_or("Error"),
            code => code,
            message => err.public_message(),
        };
        match self.render("error.html", ctx) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "error page failed to render");
                (status, err.public_message()).into_response()
            }
        }
    }
}

/// `2024-03-01T10:15:00+00:00` -> `2024-03-01 10:15`. Unparseable input is returned as-is.
fn datetime(value: String) -> String {
    chrono::DateTime::parse_from_rfc3339(&value)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or(value)
}
