#![allow(
    clippy::missing_errors_doc,
    dead_code,
    missing_docs,
    clippy::expect_used
)]
use std::time::Duration;

use anyhow::Context;
use axum::extract::Multipart;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use abeg_fetch::{Fetcher, FetcherBuilder};

pub const SESSION_COOKIE: &str = "session=s3cr3t";
pub const KNOWN_EMAIL: &str = "ada@abeg.test";
pub const SLOW_DELAY: Duration = Duration::from_secs(2);
const MIN_STORY_LENGTH: usize = 100;

/// A local backend answering like the campaign API.
#[derive(Debug)]
pub struct TestApp {
    base_url: String,
    server: JoinHandle<()>,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind test listener")?;
        let addr = listener.local_addr().context("local address")?;
        info!(%addr, "launching server");

        let server = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, router()).await {
                warn!(%error, "test server stopped");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            server,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self) -> FetcherBuilder {
        Fetcher::builder(self.base_url.as_str())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router() -> Router {
    Router::new()
        .route("/auth/signin", post(sign_in))
        .route("/auth/me", get(me))
        .route("/campaign/create/three", post(create_step_three))
        .route("/slow", get(slow))
        .route("/teapot", get(teapot))
}

fn success(data: Value, message: &str) -> Json<Value> {
    Json(json!({ "status": "success", "data": data, "message": message }))
}

fn failure(status: StatusCode, message: &str, error: Option<Value>) -> Response {
    let mut body = json!({ "status": "Error", "message": message });
    if let Some(error) = error {
        body["error"] = error;
    }
    (status, Json(body)).into_response()
}

async fn sign_in(Json(credentials): Json<Value>) -> Response {
    if credentials["email"] != KNOWN_EMAIL {
        return failure(StatusCode::UNAUTHORIZED, "Invalid credentials", None);
    }

    (
        [(SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
        success(json!({ "email": KNOWN_EMAIL }), "Signed in"),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    let has_session = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.split(';').any(|cookie| cookie.trim() == SESSION_COOKIE));

    if has_session {
        success(json!({ "email": KNOWN_EMAIL }), "Session found").into_response()
    } else {
        failure(StatusCode::UNAUTHORIZED, "Unauthorized", None)
    }
}

async fn create_step_three(headers: HeaderMap, mut multipart: Multipart) -> Response {
    let is_multipart = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data; boundary="));
    if !is_multipart {
        return failure(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a multipart body", None);
    }

    let mut story = String::new();
    let mut fields = Vec::new();
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => return failure(StatusCode::BAD_REQUEST, &error.body_text(), None),
        };
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name() {
            let file_name = file_name.to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let size = field.bytes().await.map(|bytes| bytes.len()).unwrap_or_default();
            files.push(json!({ "field": name, "name": file_name, "type": content_type, "size": size }));
        } else {
            let value = field.text().await.unwrap_or_default();
            if name == "story" {
                story.clone_from(&value);
            }
            fields.push(name);
        }
    }

    if story.chars().count() < MIN_STORY_LENGTH {
        return failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed",
            Some(json!({ "story": ["Story must be at least 100 characters"] })),
        );
    }

    success(
        json!({ "id": "abc", "fields": fields, "files": files }),
        "Campaign created",
    )
    .into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    success(Value::Null, "Finally")
}

async fn teapot() -> Response {
    (StatusCode::IM_A_TEAPOT, "short and stout").into_response()
}
