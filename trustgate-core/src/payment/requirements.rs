//! Payment requirement document construction and proof classification.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    AMOUNT_BASE_UNITS, EVM_NETWORK, MAX_TIMEOUT_SECONDS, SOLANA_NETWORK, X402_VERSION,
};

/// Configuration needed to build the requirement document. Pure data —
/// owned by `trustgate-server`'s config, passed in by value/reference here
/// so this crate stays free of env/config concerns.
#[derive(Debug, Clone)]
pub struct RequirementConfig<'a> {
    pub pay_to_evm: &'a str,
    pub asset_evm: &'a str,
    pub pay_to_solana: &'a str,
    pub asset_solana: &'a str,
    pub fee_payer_solana: &'a str,
    pub resource_url: &'a str,
}

/// One offered payment option (spec §6's `accepts[]` entries).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedRequirement {
    pub scheme: String,
    pub network: String,
    pub amount: String,
    pub pay_to: String,
    pub max_timeout_seconds: u64,
    pub asset: String,
    pub extra: Value,
}

/// Metadata about the protected resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    pub url: String,
    pub description: String,
    pub mime_type: String,
}

/// The `extensions.bazaar` advertisement block (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bazaar {
    pub info: Value,
    pub schema: Value,
}

/// The full 402 payment-required body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredDocument {
    pub x402_version: u32,
    pub accepts: Vec<AcceptedRequirement>,
    pub resource: ResourceInfo,
    pub description: String,
    pub extensions: Extensions,
}

/// Wrapper so `extensions.bazaar` serializes at the expected nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extensions {
    pub bazaar: Bazaar,
}

/// Builds the two-option payment requirement document offered on every
/// unpaid scoring request (spec §4.3).
#[must_use]
pub fn build_requirements(config: &RequirementConfig<'_>) -> PaymentRequiredDocument {
    let evm = AcceptedRequirement {
        scheme: "exact".to_owned(),
        network: EVM_NETWORK.to_owned(),
        amount: AMOUNT_BASE_UNITS.to_owned(),
        pay_to: config.pay_to_evm.to_owned(),
        max_timeout_seconds: MAX_TIMEOUT_SECONDS,
        asset: config.asset_evm.to_owned(),
        extra: json!({ "name": "USD Coin", "version": "2" }),
    };

    let solana = AcceptedRequirement {
        scheme: "exact".to_owned(),
        network: SOLANA_NETWORK.to_owned(),
        amount: AMOUNT_BASE_UNITS.to_owned(),
        pay_to: config.pay_to_solana.to_owned(),
        max_timeout_seconds: MAX_TIMEOUT_SECONDS,
        asset: config.asset_solana.to_owned(),
        extra: json!({ "feePayer": config.fee_payer_solana, "decimals": 6 }),
    };

    PaymentRequiredDocument {
        x402_version: X402_VERSION,
        accepts: vec![evm, solana],
        resource: ResourceInfo {
            url: config.resource_url.to_owned(),
            description: "Agent trust score lookup".to_owned(),
            mime_type: "application/json".to_owned(),
        },
        description: "Pay $0.01 to score one agent's trust reputation.".to_owned(),
        extensions: Extensions {
            bazaar: Bazaar {
                info: json!({
                    "input": { "entity": "Orac", "context": "optional free text" },
                    "output": {
                        "found": true,
                        "trust_score": 0.82,
                        "tier": "trusted",
                        "recommendation": "PROCEED"
                    }
                }),
                schema: json!({
                    "type": "object",
                    "required": ["entity"],
                    "properties": {
                        "entity": { "type": "string" },
                        "context": { "type": "string" }
                    }
                }),
            },
        },
    }
}

/// Which chain a presented proof targets, by payload shape alone (spec §6):
/// `payload.transaction` without `payload.authorization` is Solana,
/// everything else is EVM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofNetwork {
    Evm,
    Solana,
}

/// A decoded (but not yet verified) payment proof.
///
/// Kept as the raw [`Value`] rather than a typed struct: this component
/// never interprets the payload beyond its shape (spec §9 — cryptography
/// is the facilitator's job), and the facilitator wire contract forwards
/// the decoded object verbatim as `paymentPayload`.
#[derive(Debug, Clone)]
pub struct PaymentProof {
    pub raw: Value,
}

impl PaymentProof {
    /// Decodes a proof from its parsed JSON form.
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The `x402Version` field, if present and numeric.
    #[must_use]
    pub fn x402_version(&self) -> Option<u64> {
        self.raw.get("x402Version").and_then(Value::as_u64)
    }

    /// Classifies this proof by payload shape.
    #[must_use]
    pub fn network(&self) -> ProofNetwork {
        let payload = self.raw.get("payload");
        let has_transaction = payload.and_then(|p| p.get("transaction")).is_some();
        let has_authorization = payload.and_then(|p| p.get("authorization")).is_some();
        if has_transaction && !has_authorization {
            ProofNetwork::Solana
        } else {
            ProofNetwork::Evm
        }
    }
}

/// Selects the offered requirement matching the proof's network, falling
/// back to the first offered requirement if nothing matches (spec §4.3).
#[must_use]
pub fn select_requirement<'a>(
    accepts: &'a [AcceptedRequirement],
    network: ProofNetwork,
) -> Option<&'a AcceptedRequirement> {
    let wanted = match network {
        ProofNetwork::Evm => EVM_NETWORK,
        ProofNetwork::Solana => SOLANA_NETWORK,
    };
    accepts
        .iter()
        .find(|r| r.network == wanted)
        .or_else(|| accepts.first())
}
