//! `GET /` — content-negotiated service description (spec §4.1, §6).
//!
//! JSON is returned only when the client explicitly prefers it and does not
//! also accept HTML; otherwise the HTML landing page is served.

use axum::extract::State;
use axum::http::header::ACCEPT;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Json, Response};

use crate::graph_store::GraphStore;
use crate::response::service_info_document;
use crate::state::AppState;

/// Whether the caller's `Accept` header prefers JSON over HTML: it must
/// mention `application/json` and must not also mention `text/html`.
fn prefers_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    accept.contains("application/json") && !accept.contains("text/html")
}

pub async fn root(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if prefers_json(&headers) {
        let (entities, relations) = match state.graph_store.snapshot().await {
            Ok(snapshot) => (snapshot.entities.len(), snapshot.relations.len()),
            Err(_) => (0, 0),
        };
        return Json(service_info_document(entities, relations)).into_response();
    }

    Html(LANDING_PAGE_HTML).into_response()
}

const LANDING_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>trustgate</title>
<meta property="og:title" content="trustgate">
<meta property="og:description" content="Paid trust-scoring for a knowledge graph of software agents.">
<meta property="og:type" content="website">
</head>
<body>
<h1>trustgate</h1>
<p>Paid trust-scoring service for a knowledge graph of software agents.</p>
<p>POST /v1/score with <code>{"entity": "..."}</code>, gated by an x402 micropayment.</p>
</body>
</html>
"#;
