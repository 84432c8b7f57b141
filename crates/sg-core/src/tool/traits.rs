//! Tool trait definition
//!
//! Defines the core trait for tools exposed to the hosting agent.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::context::ContextHandle;
use crate::Result;

/// Tool execution result
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Text handed back to the language model
    pub output: String,
    /// Whether the call succeeded without data ("no results")
    pub is_empty: bool,
}

impl ToolResult {
    /// Create a tool result carrying data
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_empty: false,
        }
    }

    /// Create a result for a successful call that found nothing
    pub fn empty(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_empty: true,
        }
    }
}

/// Per-call context: which session is calling and where to log
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub session_id: String,
    pub log: ContextHandle,
}

impl ToolContext {
    pub fn new(session_id: impl Into<String>, log: ContextHandle) -> Self {
        Self {
            session_id: session_id.into(),
            log,
        }
    }
}

/// Tool trait
///
/// Failures from the remote catalog are returned as
/// [`crate::Error::Domain`] so the host can map them to an error envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description (shown to the model when selecting tools)
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's input parameters
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given input
    async fn execute(&self, input: JsonValue, ctx: &ToolContext) -> Result<ToolResult>;
}
