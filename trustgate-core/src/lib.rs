#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core domain types for `trustgate`.
//!
//! This crate is the protocol- and transport-agnostic half of the service:
//! the knowledge-graph data model, the damped-propagation reputation engine,
//! the composite trust scorer, the context screener, and the payment wire
//! types shared between the paywall and the response assembler. It has no
//! async runtime dependency and no knowledge of HTTP, KV stores, or the
//! facilitator transport — those live in `trustgate-server`.
//!
//! # Modules
//!
//! - [`model`] - graph data model (entities, relations, observations, snapshot)
//! - [`reputation`] - damped random-walk reputation propagation over trust edges
//! - [`scorer`] - composite trust score and per-component breakdown
//! - [`screener`] - regex-family context classifier
//! - [`tiers`] - tier/recommendation mapping and reputation-based ranking
//! - [`payment`] - x402 payment requirement/proof wire types and constants

pub mod model;
pub mod payment;
pub mod reputation;
pub mod scorer;
pub mod screener;
pub mod tiers;
