//! HTTP API handlers
//!
//! `/health`, the agent card and the JSON-RPC dispatcher.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value as JsonValue, json};
use tracing::{debug, error, info, warn};

use sg_core::{Error, ToolContext, envelope_for};

use crate::card::AgentCard;
use crate::jsonrpc::{ContextParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use crate::server::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Public agent card
pub async fn agent_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

/// JSON-RPC 2.0 endpoint
///
/// Always answers 200; failures travel in the `error` member.
pub async fn jsonrpc(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
    let value: JsonValue = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Unparseable JSON-RPC body");
            return Json(JsonRpcResponse::error(JsonValue::Null, JsonRpcError::parse_error(e)));
        }
    };

    let id = value.get("id").cloned().unwrap_or(JsonValue::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => return Json(JsonRpcResponse::error(id, JsonRpcError::invalid_request(e))),
    };
    if request.jsonrpc != "2.0" {
        return Json(JsonRpcResponse::error(
            request.id,
            JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
        ));
    }

    debug!(method = %request.method, "JSON-RPC request");

    let outcome = match request.method.as_str() {
        "tools/list" => Ok(list_tools(&state)),
        "tools/call" => call_tool(&state, request.params).await,
        "context/get" => get_context(&state, request.params).await,
        other => Err(JsonRpcError::method_not_found(other)),
    };

    Json(match outcome {
        Ok(result) => JsonRpcResponse::result(request.id, result),
        Err(e) => JsonRpcResponse::error(request.id, e),
    })
}

fn list_tools(state: &AppState) -> JsonValue {
    let tools: Vec<JsonValue> = state
        .tools
        .definitions()
        .into_iter()
        .map(|def| {
            json!({
                "name": def.name,
                "description": def.description,
                "inputSchema": def.input_schema,
            })
        })
        .collect();
    json!({ "tools": tools })
}

async fn call_tool(state: &AppState, params: JsonValue) -> Result<JsonValue, JsonRpcError> {
    let params: ToolCallParams =
        serde_json::from_value(params).map_err(JsonRpcError::invalid_params)?;
    if !state.tools.contains(&params.name) {
        return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)));
    }

    let session_id = params
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // New sessions log into a detached buffer that is only stored once the
    // call succeeds.
    let existing = state.contexts.get(&session_id).await;
    let log = existing.clone().unwrap_or_default();
    let ctx = ToolContext::new(session_id.clone(), Arc::clone(&log));

    info!(tool = %params.name, session_id = %session_id, "Tool call");

    let result = state
        .tools
        .execute(&params.name, params.arguments, &ctx)
        .await
        .map_err(|e| tool_error(&params.name, &e))?;

    if existing.is_none() {
        let entries = std::mem::take(&mut *log.lock().await);
        state.contexts.store(&session_id, entries).await;
    }

    Ok(json!({
        "content": [{ "type": "text", "text": result.output }],
        "isEmpty": result.is_empty,
        "session_id": session_id,
    }))
}

/// Bad input is the caller's fault; everything else goes through the envelope
fn tool_error(tool: &str, e: &Error) -> JsonRpcError {
    match e {
        Error::InvalidInput(_) | Error::UnknownTool(_) => {
            warn!(tool, error = %e, "Rejected tool input");
            JsonRpcError::invalid_params(e)
        }
        _ => {
            let envelope = envelope_for(e);
            error!(tool, code = envelope.code, error = %e, "Tool call failed");
            envelope.into()
        }
    }
}

async fn get_context(state: &AppState, params: JsonValue) -> Result<JsonValue, JsonRpcError> {
    let params: ContextParams =
        serde_json::from_value(params).map_err(JsonRpcError::invalid_params)?;
    let log = state
        .contexts
        .snapshot(&params.session_id)
        .await
        .ok_or_else(|| {
            JsonRpcError::invalid_params(format!("Unknown session: {}", params.session_id))
        })?;

    serde_json::to_value(&log).map_err(|e| envelope_for(&Error::from(e)).into())
}
