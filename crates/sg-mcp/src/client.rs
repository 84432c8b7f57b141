//! MCP Client implementation
//!
//! rmcp の Streamable HTTP トランスポートで Statista MCP サーバーと通信するクライアント

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rmcp::{
    model::{CallToolRequestParams, Content, RawContent, Tool},
    service::{RoleClient, RunningService, ServiceExt},
    transport::{
        StreamableHttpClientTransport, streamable_http_client::StreamableHttpClientTransportConfig,
    },
};
use serde_json::Value as JsonValue;
use tracing::debug;

use sg_core::{StatistaConfig, ToolDescriptor};

use crate::error::{InvokeError, Result};
use crate::invoker::{InvokerFactory, RemoteToolInvoker};

/// Header carrying the Statista API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// One fragment per content item. Non-text items become empty fragments so
/// positional roles in the reply keep their index.
fn fragments_from(content: Vec<Content>) -> Vec<String> {
    content
        .into_iter()
        .map(|c| match c.raw {
            RawContent::Text(text) => text.text,
            _ => String::new(),
        })
        .collect()
}

/// Text of an error reply, skipping the placeholders of non-text items
fn declared_message(fragments: &[String]) -> String {
    fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

fn descriptor(tool: Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.clone().unwrap_or_default().to_string(),
    }
}

/// MCP client for the Statista endpoint
///
/// Each call opens its own MCP session and closes it afterwards, so a broken
/// session never outlives the call that hit it. The HTTP connection pool is
/// shared across calls.
pub struct McpInvoker {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl McpInvoker {
    /// Build a client that sends `api_key` on every request
    pub fn new(config: &StatistaConfig, api_key: &str) -> Result<Self> {
        let mut key =
            HeaderValue::from_str(api_key).map_err(|e| InvokeError::Client(e.to_string()))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| InvokeError::Client(e.to_string()))?;

        Ok(Self {
            http,
            url: config.mcp_url.clone(),
            timeout: config.request_timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<RunningService<RoleClient, ()>> {
        let transport = StreamableHttpClientTransport::with_client(
            self.http.clone(),
            StreamableHttpClientTransportConfig::with_uri(self.url.clone()),
        );

        // Serve with unit type handler (client-only mode)
        ().serve(transport).await.map_err(|e| InvokeError::Connect(e.to_string()))
    }

    async fn close(service: RunningService<RoleClient, ()>) {
        if let Err(e) = service.cancel().await {
            debug!(error = %e, "MCP session did not shut down cleanly");
        }
    }

    async fn call_once(&self, name: &str, args: JsonValue) -> Result<Vec<String>> {
        let service = self.connect().await?;

        let result = service
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_string().into(),
                arguments: args.as_object().cloned(),
                task: None,
            })
            .await;
        Self::close(service).await;

        let result = result.map_err(|e| InvokeError::Transport(e.to_string()))?;
        let is_error = result.is_error.unwrap_or(false);
        let fragments = fragments_from(result.content);

        if is_error {
            return Err(InvokeError::Declared {
                tool: name.to_string(),
                message: declared_message(&fragments),
            });
        }

        Ok(fragments)
    }

    async fn list_once(&self) -> Result<Vec<ToolDescriptor>> {
        let service = self.connect().await?;
        let result = service.list_tools(Default::default()).await;
        Self::close(service).await;

        let result =
            result.map_err(|e| InvokeError::Transport(format!("Failed to list tools: {}", e)))?;
        Ok(result.tools.into_iter().map(descriptor).collect())
    }
}

#[async_trait]
impl RemoteToolInvoker for McpInvoker {
    async fn invoke(&self, tool_name: &str, args: JsonValue) -> anyhow::Result<Vec<String>> {
        debug!(tool = tool_name, url = %self.url, "Calling MCP tool");
        let fragments = tokio::time::timeout(self.timeout, self.call_once(tool_name, args))
            .await
            .map_err(|_| InvokeError::Timeout(self.timeout))??;
        debug!(tool = tool_name, fragments = fragments.len(), "MCP tool returned");
        Ok(fragments)
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDescriptor>> {
        let tools = tokio::time::timeout(self.timeout, self.list_once())
            .await
            .map_err(|_| InvokeError::Timeout(self.timeout))??;
        Ok(tools)
    }
}

/// Factory used in production: an [`McpInvoker`] per registry
#[derive(Debug, Default, Clone, Copy)]
pub struct McpInvokerFactory;

#[async_trait]
impl InvokerFactory for McpInvokerFactory {
    async fn create(
        &self,
        config: &StatistaConfig,
        api_key: &str,
    ) -> anyhow::Result<Arc<dyn RemoteToolInvoker>> {
        let invoker = McpInvoker::new(config, api_key)?;
        Ok(Arc::new(invoker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::{ChartParse, parse_chart_dataset};

    #[test]
    fn test_non_text_content_keeps_fragment_positions() {
        let content = vec![
            Content::text(r#"{"graphType":"bar","title":"EV sales"}"#),
            Content::image("aGVsbG8=", "image/png"),
            Content::text(r#"[{"title":"IEA"}]"#),
            Content::text("https://www.statista.com/statistics/42"),
        ];
        let fragments = fragments_from(content);
        assert_eq!(fragments.len(), 4);
        assert_eq!(fragments[1], "");

        // the array at index 2 is still read as the source list
        let dataset = match parse_chart_dataset(&fragments, 42) {
            ChartParse::Parsed(dataset) => dataset,
            other => panic!("expected dataset, got {other:?}"),
        };
        assert_eq!(dataset.sources.len(), 1);
        assert_eq!(dataset.sources[0].title, "IEA");
        assert_eq!(dataset.url.as_deref(), Some("https://www.statista.com/statistics/42"));
    }

    #[test]
    fn test_declared_message_skips_non_text_items() {
        let fragments = fragments_from(vec![
            Content::text("quota exceeded"),
            Content::image("aGVsbG8=", "image/png"),
            Content::text("try later"),
        ]);
        assert_eq!(declared_message(&fragments), "quota exceeded\ntry later");
    }

    #[test]
    fn test_invoker_takes_endpoint_from_config() {
        let config = StatistaConfig {
            mcp_url: "https://mcp.example.com/v1".into(),
            ..Default::default()
        };
        let invoker = McpInvoker::new(&config, "key-123").unwrap();
        assert_eq!(invoker.url(), "https://mcp.example.com/v1");
        assert_eq!(invoker.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_header_value_is_client_error() {
        let result = McpInvoker::new(&StatistaConfig::default(), "bad\nkey");
        assert!(matches!(result, Err(InvokeError::Client(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_without_panicking() {
        let config = StatistaConfig {
            mcp_url: "http://127.0.0.1:9/mcp".into(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let invoker = McpInvokerFactory.create(&config, "key").await.unwrap();
        let result = invoker
            .invoke("search-statistics", serde_json::json!({"query": "x"}))
            .await;
        assert!(result.is_err());
    }
}
