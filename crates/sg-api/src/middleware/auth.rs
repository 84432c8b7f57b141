//! Authentication middleware
//!
//! Bearer token authentication for the JSON-RPC endpoint.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;

/// Expected bearer token. `None` disables the check.
#[derive(Clone, Default)]
pub struct BearerAuth {
    token: Option<Arc<str>>,
}

impl BearerAuth {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Check an `Authorization` header value
    pub fn verify(&self, authorization: Option<&str>) -> Result<(), ApiError> {
        let Some(expected) = self.token.as_deref() else {
            // No token configured, allow request
            return Ok(());
        };

        let Some(value) = authorization else {
            return Err(ApiError::Unauthorized("Missing Authorization header".into()));
        };
        let Some(provided) = value.strip_prefix("Bearer ") else {
            return Err(ApiError::Unauthorized(
                "Invalid Authorization header format, expected 'Bearer <token>'".into(),
            ));
        };

        if provided.trim() == expected {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("Invalid bearer token".into()))
        }
    }
}

/// Bearer token authentication middleware
pub async fn bearer_auth(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = auth.verify(authorization) {
        warn!(path = %request.uri().path(), reason = %e, "Rejected unauthenticated request");
        return Err(e);
    }

    Ok(next.run(request).await)
}
