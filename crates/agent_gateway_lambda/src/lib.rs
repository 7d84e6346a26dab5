//! AWS-oriented adapters and handlers for the agent proxy gateway.
//!
//! This crate owns runtime integration details (the Lambda proxy handler,
//! the agent invocation seam, and the deployable binaries) and leans on
//! `agent_gateway_core` for contracts, validation, and response assembly.

pub mod adapters;
pub mod handlers;
