//! JSON-RPC error envelope
//!
//! Maps classified failures onto the fixed error codes clients depend on.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::classify::{ClassifiedError, DomainErrorKind};
use crate::Error;

/// Unauthorized (like HTTP 401)
pub const AUTHENTICATION_ERROR_CODE: i32 = -32401;
/// Request timeout (like HTTP 408)
pub const TIMEOUT_ERROR_CODE: i32 = -32408;
/// Bad gateway (like HTTP 502)
pub const EXTERNAL_SERVICE_ERROR_CODE: i32 = -32502;
/// JSON-RPC internal error
pub const INTERNAL_ERROR_CODE: i32 = -32603;

const AUTH_HINT: &str = "Please check that your STATISTA_API_KEY is valid and not expired.";
const TIMEOUT_HINT: &str = "The request to Statista API timed out. Please try again.";

/// Wire-level error object: `{code, message, data}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolErrorEnvelope {
    pub code: i32,
    pub message: String,
    pub data: Map<String, JsonValue>,
}

impl ProtocolErrorEnvelope {
    /// Look up a `data` entry as a string
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(JsonValue::as_str)
    }
}

/// Build the envelope for a classified error
pub fn to_envelope(error: &ClassifiedError) -> ProtocolErrorEnvelope {
    let mut data = Map::new();

    let (code, message) = match error.kind() {
        DomainErrorKind::Authentication => {
            data.insert("error_type".into(), "authentication_error".into());
            data.insert("details".into(), error.detail().into());
            data.insert("auth_scheme".into(), "API-Key".into());
            data.insert("hint".into(), AUTH_HINT.into());
            (AUTHENTICATION_ERROR_CODE, "Authentication failed")
        }
        DomainErrorKind::Timeout => {
            data.insert("error_type".into(), "timeout_error".into());
            data.insert("details".into(), error.detail().into());
            data.insert("hint".into(), TIMEOUT_HINT.into());
            (TIMEOUT_ERROR_CODE, "Request timeout")
        }
        DomainErrorKind::UpstreamApi => {
            data.insert("error_type".into(), "api_error".into());
            data.insert("details".into(), error.detail().into());
            data.insert("service".into(), "Statista API".into());
            (EXTERNAL_SERVICE_ERROR_CODE, "External service error")
        }
        DomainErrorKind::Internal => {
            data.insert("error_type".into(), "internal_error".into());
            data.insert("details".into(), error.detail().into());
            (INTERNAL_ERROR_CODE, "Internal error")
        }
    };

    ProtocolErrorEnvelope {
        code,
        message: message.to_string(),
        data,
    }
}

/// Build the envelope for any crate error
///
/// Errors that never went through the classifier land on the internal row.
pub fn envelope_for(error: &Error) -> ProtocolErrorEnvelope {
    match error.as_domain() {
        Some(classified) => to_envelope(classified),
        None => to_envelope(&ClassifiedError::internal(error.to_string())),
    }
}
