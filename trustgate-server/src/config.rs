//! Server configuration, sourced entirely from the process environment.
//!
//! Unlike the teacher facilitator's TOML-plus-env-expansion config (this
//! service has no per-chain signer material to keep out of source control —
//! only a KV binding, a facilitator URL, and public pay-to addresses), every
//! setting here is a plain environment variable (spec §6 expansion).

use std::collections::HashSet;
use std::net::SocketAddr;

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// URL of the external graph-snapshot store.
    pub graph_url: String,
    /// Key under which the snapshot is stored.
    pub graph_key: String,
    /// Base URL of the x402 payment facilitator.
    pub facilitator_url: String,
    /// EVM pay-to address.
    pub pay_to_evm: String,
    /// EVM asset (USDC) contract address.
    pub asset_evm: String,
    /// Solana pay-to address.
    pub pay_to_solana: String,
    /// Solana asset (USDC) mint address.
    pub asset_solana: String,
    /// Solana fee-payer address advertised in the requirement's `extra`.
    pub fee_payer_solana: String,
    /// IPs exempt from rate limiting.
    pub rate_limit_bypass: HashSet<String>,
}

/// Error loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Config {
    /// Loads configuration from environment variables, per spec §6's
    /// expanded environment-variable table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a
    /// present variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = optional("TRUSTGATE_BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8787".to_owned())
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "TRUSTGATE_BIND_ADDR",
                source: Box::new(e),
            })?;

        let rate_limit_bypass = optional("TRUSTGATE_RATE_LIMIT_BYPASS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            graph_url: required("TRUSTGATE_GRAPH_URL")?,
            graph_key: optional("TRUSTGATE_GRAPH_KEY").unwrap_or_else(|| "agent-graph:v1".to_owned()),
            facilitator_url: required("TRUSTGATE_FACILITATOR_URL")?,
            pay_to_evm: required("TRUSTGATE_PAY_TO_EVM")?,
            asset_evm: optional("TRUSTGATE_ASSET_EVM")
                .unwrap_or_else(|| "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_owned()),
            pay_to_solana: required("TRUSTGATE_PAY_TO_SOLANA")?,
            asset_solana: optional("TRUSTGATE_ASSET_SOLANA")
                .unwrap_or_else(|| "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_owned()),
            fee_payer_solana: required("TRUSTGATE_FEE_PAYER_SOLANA")?,
            rate_limit_bypass,
        })
    }
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok()
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_bypass_parses_comma_separated_list() {
        // unsafe because std::env::set_var is process-global; this test
        // runs single-threaded within the crate's test binary by default
        // for env-mutating tests of this shape.
        unsafe {
            std::env::set_var("TRUSTGATE_RATE_LIMIT_BYPASS", "1.2.3.4, 5.6.7.8,,9.9.9.9");
        }
        let bypass = optional("TRUSTGATE_RATE_LIMIT_BYPASS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect::<HashSet<_>>()
            })
            .unwrap_or_default();
        assert!(bypass.contains("1.2.3.4"));
        assert!(bypass.contains("5.6.7.8"));
        assert!(bypass.contains("9.9.9.9"));
        assert_eq!(bypass.len(), 3);
        unsafe {
            std::env::remove_var("TRUSTGATE_RATE_LIMIT_BYPASS");
        }
    }
}
