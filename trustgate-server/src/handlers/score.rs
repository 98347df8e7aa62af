//! `POST /v1/score` — the full paid scoring pipeline (spec §2, §4).
//!
//! Data flow: RateLimiter → PaymentGate(builder) if no proof → else
//! PaymentGate(verify+settle) → parse body → GraphLoader → ContextScreener
//! (optional) → ReputationEngine (cached) → CompositeScorer →
//! ResponseAssembler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;

use trustgate_core::payment::{self, RequirementConfig};
use trustgate_core::screener;

use crate::error::ApiError;
use crate::graph_store::GraphStore;
use crate::payment_gate;
use crate::rate_limit::{self, Decision};
use crate::response::{self, PAYMENT_CONFIRMED_HEADER};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    entity: String,
    #[serde(default)]
    context: Option<String>,
}

/// Header checked for the edge-proxy-reported client IP. The first
/// comma-separated entry is the original client (spec §4.2).
const CLIENT_IP_HEADER: &str = "X-Forwarded-For";

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get(CLIENT_IP_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(rate_limit::UNKNOWN_CLIENT)
        .to_owned()
}

fn resource_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("https://{host}/v1/score")
}

pub async fn score(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match run(&state, &headers, &body).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[tracing::instrument(skip_all, fields(client_ip))]
async fn run(state: &AppState, headers: &HeaderMap, body: &Bytes) -> Result<Response, ApiError> {
    let client = client_ip(headers);
    tracing::Span::current().record("client_ip", client.as_str());
    if rate_limit::check(state.kv.as_ref(), &state.config.rate_limit_bypass, &client) == Decision::Exceeded {
        tracing::warn!(client_ip = %client, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let resource_url = resource_url(headers);
    let config = RequirementConfig {
        pay_to_evm: &state.config.pay_to_evm,
        asset_evm: &state.config.asset_evm,
        pay_to_solana: &state.config.pay_to_solana,
        asset_solana: &state.config.asset_solana,
        fee_payer_solana: &state.config.fee_payer_solana,
        resource_url: &resource_url,
    };

    let proof_header = payment_gate::extract_proof_header(headers);

    let Some(proof_header) = proof_header else {
        let doc = payment::build_requirements(&config);
        return Err(ApiError::PaymentMissing(Box::new(doc)));
    };

    let paid = payment_gate::process_proof(state.facilitator.as_ref(), &config, proof_header)
        .await
        .map_err(|e| {
            tracing::warn!(reason = %e, "payment verification or settlement failed");
            ApiError::PaymentInvalid(e.to_string())
        })?;

    let request: ScoreRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;
    if request.entity.trim().is_empty() {
        return Err(ApiError::BadRequest("missing required field `entity`".to_owned()));
    }

    let snapshot = state.graph_store.snapshot().await.map_err(|e| {
        tracing::error!(error = %e, "knowledge graph unavailable");
        ApiError::GraphUnavailable
    })?;

    let safety = request.context.as_deref().map(screener::screen);

    let reputation = state.reputation_cache.get_or_compute(&snapshot).await;
    let now = Utc::now();

    let body = if snapshot.entity(&request.entity).is_some() {
        response::assemble_found(&request.entity, &snapshot, &reputation, safety, paid.payer, now)
    } else {
        response::assemble_unknown(&request.entity, safety, paid.payer)
    };

    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(PAYMENT_CONFIRMED_HEADER, HeaderValue::from_static("true"));
    Ok(response)
}
