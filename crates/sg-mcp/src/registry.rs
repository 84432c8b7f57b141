//! Shared client registry
//!
//! Statista MCP クライアントをプロセス内で一度だけ生成し、共有します。

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use sg_core::{ClassifiedError, StatistaConfig};

use crate::client::McpInvokerFactory;
use crate::invoker::{InvokerFactory, RemoteToolInvoker};

/// Detail reported when no API key is configured
pub const MISSING_API_KEY_DETAIL: &str = "Authentication failed: STATISTA_API_KEY environment variable is required. Please set your Statista API key in the .env file.";

/// Lazily built, shared invoker handle
///
/// The async mutex is the initialization guard: the first caller builds the
/// handle while holding it and later callers wait, then reuse. If the first
/// caller is cancelled mid-construction the slot stays empty.
pub struct SharedClientRegistry {
    config: StatistaConfig,
    factory: Arc<dyn InvokerFactory>,
    slot: Mutex<Option<Arc<dyn RemoteToolInvoker>>>,
}

impl SharedClientRegistry {
    /// Registry backed by the rmcp client
    pub fn new(config: StatistaConfig) -> Self {
        Self::with_factory(config, Arc::new(McpInvokerFactory))
    }

    pub fn with_factory(config: StatistaConfig, factory: Arc<dyn InvokerFactory>) -> Self {
        Self {
            config,
            factory,
            slot: Mutex::new(None),
        }
    }

    /// Return the shared handle, building it on first use
    pub async fn get_or_create(&self) -> Result<Arc<dyn RemoteToolInvoker>, ClassifiedError> {
        let mut slot = self.slot.lock().await;
        if let Some(invoker) = slot.as_ref() {
            return Ok(Arc::clone(invoker));
        }

        info!(url = %self.config.mcp_url, "Initializing Statista MCP client");

        let Some(api_key) = self.config.api_key() else {
            error!("STATISTA_API_KEY is not set");
            return Err(ClassifiedError::authentication(MISSING_API_KEY_DETAIL));
        };
        debug!(api_key_present = true, "API key loaded");

        let invoker = self.factory.create(&self.config, api_key).await.map_err(|e| {
            error!(error = %e, "Failed to create Statista MCP client");
            ClassifiedError::upstream(format!("Failed to create Statista MCP client: {}", e))
                .with_cause(e)
        })?;

        *slot = Some(Arc::clone(&invoker));
        info!("Statista MCP client initialized");
        Ok(invoker)
    }

    /// Drop the cached handle; the next call builds a fresh one
    pub async fn reset(&self) {
        if self.slot.lock().await.take().is_some() {
            info!("Statista MCP client reset");
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    pub fn config(&self) -> &StatistaConfig {
        &self.config
    }
}
