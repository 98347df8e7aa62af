//! x402 payment wire types and constants (spec §6).
//!
//! This module is deliberately thin: it models only the requirement
//! document and proof shapes this service needs to build and classify.
//! Cryptographic verification and settlement are delegated entirely to the
//! facilitator (spec §9 Design Notes) — this crate never inspects a
//! signature, only the proof's *shape*.

mod requirements;

pub use requirements::{
    build_requirements, select_requirement, AcceptedRequirement, Bazaar, PaymentProof,
    PaymentRequiredDocument, ProofNetwork, RequirementConfig, ResourceInfo,
};

/// x402 protocol version advertised on the wire.
pub const X402_VERSION: u32 = 2;

/// Payment amount in the asset's base unit — `$0.01` at USDC's 6 decimals.
pub const AMOUNT_BASE_UNITS: &str = "10000";

/// Maximum validity window for a presented payment, in seconds.
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// CAIP-2 chain id for the EVM option (Base mainnet).
pub const EVM_NETWORK: &str = "eip155:8453";

/// Chain id literal for the Solana option.
pub const SOLANA_NETWORK: &str = "solana:mainnet";

/// The header name carrying the proof, checked first.
pub const HEADER_PAYMENT_SIGNATURE: &str = "Payment-Signature";

/// The fallback header name carrying the proof.
pub const HEADER_X_PAYMENT: &str = "X-Payment";

/// Payment success echo attached to every paid response (spec §4.8).
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentEcho {
    pub amount: &'static str,
    pub currency: &'static str,
    pub payer: Option<String>,
}

impl PaymentEcho {
    #[must_use]
    pub fn new(payer: Option<String>) -> Self {
        Self {
            amount: "0.01",
            currency: "USDC",
            payer,
        }
    }
}
