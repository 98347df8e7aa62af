//! HTTP client for the remote x402 payment facilitator (spec §4.3).
//!
//! Grounded on `r402-http::server::facilitator_client::FacilitatorClient`:
//! same `reqwest`-based POST-JSON pattern and layered error enum. Narrowed
//! to the two endpoints this service actually calls — no `/supported`, no
//! cache, no telemetry feature gate — because the facilitator wire contract
//! here (spec §6) is a flat JSON envelope, not the teacher's typed
//! `VerifyRequest`/`SettleRequest` protocol structs.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::truncate;
use trustgate_core::payment::AcceptedRequirement;

/// Facilitator calls must carry a deadline no greater than the offered
/// requirement's `maxTimeoutSeconds` (spec §5); this client defaults to a
/// much shorter budget since scoring requests are interactive.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Response body of a successful `POST /verify` (spec §6).
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub payer: Option<String>,
    #[serde(rename = "invalidReason")]
    pub invalid_reason: Option<String>,
}

/// Outcome of a full verify-then-settle round trip.
#[derive(Debug, Clone)]
pub struct SettledPayment {
    pub payer: Option<String>,
}

/// Failure modes of the payment gate's facilitator calls (spec §4.3, §7).
/// Every variant's `Display` is the truncated reason string placed
/// directly in a `PaymentInvalid` response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FacilitatorError {
    #[error("Verify: {0}")]
    Verify(String),
    #[error("{0}")]
    Invalid(String),
    #[error("Settle: {0}")]
    Settle(String),
    #[error("payment_error: {0}")]
    Transport(String),
}

/// A thin client over a remote facilitator's `/verify` and `/settle`.
#[derive(Debug, Clone)]
pub struct FacilitatorClient {
    client: reqwest::Client,
    verify_url: Url,
    settle_url: Url,
}

impl FacilitatorClient {
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot be joined to `verify`/`settle`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            client: reqwest::Client::new(),
            verify_url: base.join("./verify")?,
            settle_url: base.join("./settle")?,
        })
    }

    /// Runs the full verify-then-settle sequence for one presented proof
    /// against one selected requirement (spec §4.3 steps 3-4).
    ///
    /// Settle is only attempted if verify returned `isValid=true` and 2xx
    /// (spec §8 invariant). Any exception anywhere in this path is mapped
    /// to `FacilitatorError::Transport`, matching the spec's blanket
    /// `"payment_error: " + message` clause.
    #[tracing::instrument(skip_all, fields(network = %requirement.network))]
    pub async fn verify_and_settle(
        &self,
        x402_version: u32,
        payload: &Value,
        requirement: &AcceptedRequirement,
    ) -> Result<SettledPayment, FacilitatorError> {
        let body = json!({
            "x402Version": x402_version,
            "paymentPayload": payload,
            "paymentRequirements": requirement,
        });

        let verify = self.post_json(&self.verify_url, &body).await.map_err(|e| match e {
            PostError::Status(_, text) => FacilitatorError::Verify(truncate(&text)),
            PostError::Transport(message) => FacilitatorError::Transport(message),
        })?;

        let verify: VerifyResponse = serde_json::from_value(verify)
            .map_err(|e| FacilitatorError::Transport(e.to_string()))?;

        if !verify.is_valid {
            let reason = verify
                .invalid_reason
                .unwrap_or_else(|| "payment rejected".to_owned());
            return Err(FacilitatorError::Invalid(truncate(&reason)));
        }

        self.post_json(&self.settle_url, &body).await.map_err(|e| match e {
            PostError::Status(_, text) => FacilitatorError::Settle(truncate(&text)),
            PostError::Transport(message) => FacilitatorError::Transport(message),
        })?;

        Ok(SettledPayment { payer: verify.payer })
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, PostError> {
        let response = self
            .client
            .post(url.clone())
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| PostError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| String::new());
            return Err(PostError::Status(status.as_u16(), text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PostError::Transport(e.to_string()))
    }
}

enum PostError {
    Status(u16, String),
    Transport(String),
}
