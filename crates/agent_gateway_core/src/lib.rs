//! Shared agent-gateway domain primitives.
//!
//! This crate owns the request/response contracts, body validation, the
//! error taxonomy, and streamed-output reassembly for the proxy gateway.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod runtime_arn;
