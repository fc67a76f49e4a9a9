use super::{AppState, Problem};
use crate::import::{ImportRequest, Importer};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Serialize)]
struct Pong {
    message: &'static str,
}

#[derive(Serialize)]
struct Version {
    name: &'static str,
    version: &'static str,
}

/// `GET /`
pub async fn ping() -> Json<impl Serialize> {
    Json(Pong { message: "pong" })
}

/// `GET /import/github/version`
pub async fn version() -> Json<impl Serialize> {
    Json(Version {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /import/github`. Answers 201 with an empty body once every
/// project and branch is written, or a problem document naming the first
/// failure.
pub async fn import(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let req: ImportRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => return Problem::invalid_param(format!("invalid import request: {e}")).into_response(),
    };

    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let registry = Arc::new(state.registry.with_auth_header(auth_header));
    let importer = Importer::new(registry, Arc::clone(&state.source));

    match importer.run(&req).await {
        Ok(summary) => {
            info!(
                projects = summary.projects,
                branches = summary.branches,
                "import finished"
            );
            StatusCode::CREATED.into_response()
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, request = ?req, "import failed");
            Problem::from(&e).into_response()
        }
    }
}
