//! The payment gate (spec §4.3): builds the requirement document for unpaid
//! requests, and decodes, classifies, verifies, and settles a presented
//! proof.
//!
//! Grounded on `r402-http::server::paygate::Paygate` for the header-name
//! constant and the shape of the gate's lifecycle, simplified to this
//! service's flat wire contract (spec §6) in place of the teacher's typed
//! V1/V2 protocol payloads.

use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use trustgate_core::payment::{self, PaymentProof, RequirementConfig};

use crate::facilitator_client::{FacilitatorClient, FacilitatorError};

/// The V2 payment header name, checked before the fallback (spec §4.3).
pub const PAYMENT_SIGNATURE_HEADER: &str = "Payment-Signature";
/// The fallback payment header name.
pub const X_PAYMENT_HEADER: &str = "X-Payment";

/// Outcome of a settled payment.
#[derive(Debug, Clone)]
pub struct PaidRequest {
    pub payer: Option<String>,
}

/// Reads the caller's presented proof from whichever header is set,
/// `Payment-Signature` taking precedence (spec §4.3).
#[must_use]
pub fn extract_proof_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(PAYMENT_SIGNATURE_HEADER)
        .or_else(|| headers.get(X_PAYMENT_HEADER))
        .and_then(|v| v.to_str().ok())
}

/// Runs the full decode → classify → verify → settle sequence for a
/// presented proof header value (spec §4.3 steps 1-4).
///
/// Any failure collapses into [`FacilitatorError`] carrying the exact
/// reason string the spec requires (`"Verify: ..."`, `"Settle: ..."`, or
/// `"payment_error: ..."`).
#[tracing::instrument(skip_all)]
pub async fn process_proof(
    facilitator: &FacilitatorClient,
    config: &RequirementConfig<'_>,
    proof_header: &str,
) -> Result<PaidRequest, FacilitatorError> {
    let decoded = decode_proof(proof_header).map_err(FacilitatorError::Transport)?;

    let requirements = payment::build_requirements(config);
    let network = decoded.network();
    let requirement = payment::select_requirement(&requirements.accepts, network)
        .ok_or_else(|| FacilitatorError::Transport("no offered requirement".to_owned()))?;

    let x402_version = decoded.x402_version().unwrap_or(u64::from(payment::X402_VERSION)) as u32;

    let settled = facilitator
        .verify_and_settle(x402_version, &decoded.raw, requirement)
        .await?;

    Ok(PaidRequest {
        payer: settled.payer,
    })
}

/// Base64-decodes and JSON-parses a presented proof header value.
fn decode_proof(header_value: &str) -> Result<PaymentProof, String> {
    let bytes = STANDARD
        .decode(header_value.trim())
        .map_err(|e| e.to_string())?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
    Ok(PaymentProof::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_payment_signature_header_over_x_payment() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_SIGNATURE_HEADER, HeaderValue::from_static("sig-value"));
        headers.insert(X_PAYMENT_HEADER, HeaderValue::from_static("x-value"));
        assert_eq!(extract_proof_header(&headers), Some("sig-value"));
    }

    #[test]
    fn falls_back_to_x_payment_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_PAYMENT_HEADER, HeaderValue::from_static("x-value"));
        assert_eq!(extract_proof_header(&headers), Some("x-value"));
    }

    #[test]
    fn decode_proof_rejects_invalid_base64() {
        assert!(decode_proof("not-base64!!").is_err());
    }

    #[test]
    fn decode_proof_parses_valid_payload() {
        let json = serde_json::json!({"x402Version": 2, "payload": {}});
        let encoded = STANDARD.encode(json.to_string());
        let proof = decode_proof(&encoded).unwrap();
        assert_eq!(proof.x402_version(), Some(2));
    }
}
