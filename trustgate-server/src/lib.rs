//! Library half of `trustgate-server`: everything the binary wires up, kept
//! importable for integration tests. Mirrors `r402-facilitator`'s
//! lib/bin split (`FacilitatorState`/`facilitator_router` live in its
//! `lib.rs`; `main.rs` only loads config and calls `axum::serve`).

pub mod cache;
pub mod config;
pub mod error;
pub mod facilitator_client;
pub mod graph_store;
pub mod handlers;
pub mod kv;
pub mod payment_gate;
pub mod rate_limit;
pub mod response;
pub mod router;
pub mod state;
