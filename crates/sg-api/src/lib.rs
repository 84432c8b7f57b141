//! sg-api: JSON-RPC host for statgate
//!
//! Exposes the registered tools over JSON-RPC 2.0 with bearer token
//! authentication, plus a public agent card.
//! Built with axum for async HTTP handling.

pub mod card;
pub mod error;
pub mod handlers;
pub mod jsonrpc;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, build_router, start_server};
