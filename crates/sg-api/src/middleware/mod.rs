//! Middleware modules
//!
//! Contains bearer token authentication.

pub mod auth;
