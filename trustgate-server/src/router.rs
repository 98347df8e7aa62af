//! Route table and transport-level concerns (spec §4.1, §6): CORS preflight,
//! the allow-listed path/method set, and not-found/method-not-allowed
//! fallbacks.
//!
//! Grounded on `r402-facilitator::main`'s `Router::new().merge(...).layer(cors)`
//! composition.

use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;
use crate::handlers::{health, root, score};
use crate::state::AppState;

/// Builds the full application router (spec §4.1's allow-list: preflight on
/// any path, `GET /`, `GET /health`, `POST /v1/score`; everything else is
/// not-found, and a matched path with the wrong method is
/// method-not-allowed).
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/", route_with_405(get(root::root)))
        .route("/health", route_with_405(get(health::health)))
        .route("/v1/score", route_with_405(post(score::score)))
        .fallback(not_found)
        .layer(cors_layer())
        .with_state(state)
}

/// Overrides a route's default bare 405 with [`ApiError::MethodNotAllowed`]'s
/// JSON envelope, so a registered path hit with the wrong method still gets
/// the `{ "error", ... }` shape spec §7 mandates for every user-visible
/// failure.
fn route_with_405(method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.fallback(method_not_allowed)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("payment-signature"),
            axum::http::HeaderName::from_static("x-payment"),
        ])
}

/// Catches any path that doesn't match the allow-list above (spec §4.1:
/// "all others return a not-found envelope").
async fn not_found() -> Response {
    ApiError::NotFound.into_response()
}

/// Catches a registered path hit with an unregistered method.
async fn method_not_allowed() -> Response {
    ApiError::MethodNotAllowed.into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::cache::ReputationCache;
    use crate::config::Config;
    use crate::facilitator_client::FacilitatorClient;
    use crate::graph_store::InMemoryGraphStore;
    use crate::kv::InMemoryKvStore;

    fn test_state() -> AppState {
        let config = Config {
            bind_addr: "0.0.0.0:0".parse::<SocketAddr>().unwrap(),
            graph_url: "unused".to_owned(),
            graph_key: "agent-graph:v1".to_owned(),
            facilitator_url: "http://localhost:0".to_owned(),
            pay_to_evm: "0xPayTo".to_owned(),
            asset_evm: "0xAsset".to_owned(),
            pay_to_solana: "SolPayTo".to_owned(),
            asset_solana: "SolAsset".to_owned(),
            fee_payer_solana: "SolFeePayer".to_owned(),
            rate_limit_bypass: HashSet::new(),
        };
        AppState {
            graph_store: Arc::new(InMemoryGraphStore::default()),
            kv: Arc::new(InMemoryKvStore::new()),
            reputation_cache: Arc::new(ReputationCache::new()),
            facilitator: Arc::new(FacilitatorClient::new("http://localhost:0/").unwrap()),
            config: Arc::new(config),
        }
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_returns_json_envelope() {
        let app = build(test_state());
        let request = Request::builder()
            .method("GET")
            .uri("/v1/score")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "method not allowed" }));
    }

    #[tokio::test]
    async fn unregistered_path_returns_not_found_envelope() {
        let app = build(test_state());
        let request = Request::builder()
            .method("GET")
            .uri("/nope")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "not found" }));
    }
}
