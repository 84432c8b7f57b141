//! Remote tool invocation seam
//!
//! The service only talks to these traits, so tests and alternative
//! transports can stand in for the MCP client.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use sg_core::{StatistaConfig, ToolDescriptor};

/// Calls tools on the remote catalog
#[async_trait]
pub trait RemoteToolInvoker: Send + Sync {
    /// Call `tool_name` and return its text fragments in order
    ///
    /// Any failure is opaque here; callers classify it.
    async fn invoke(&self, tool_name: &str, args: JsonValue) -> anyhow::Result<Vec<String>>;

    /// List the tools the remote server offers
    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDescriptor>>;
}

/// Builds the shared invoker handle
#[async_trait]
pub trait InvokerFactory: Send + Sync {
    /// `api_key` is already checked to be present
    async fn create(
        &self,
        config: &StatistaConfig,
        api_key: &str,
    ) -> anyhow::Result<Arc<dyn RemoteToolInvoker>>;
}
