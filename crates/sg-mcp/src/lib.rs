//! sg-mcp: Statista MCP Integration
//!
//! Statista MCP サーバーと通信し、検索・チャート取得を sg-core の Tool trait
//! として提供します。

pub mod client;
pub mod error;
pub mod invoker;
pub mod registry;
pub mod service;
pub mod tools;

#[cfg(test)]
mod testing;

pub use client::{McpInvoker, McpInvokerFactory};
pub use error::InvokeError;
pub use invoker::{InvokerFactory, RemoteToolInvoker};
pub use registry::SharedClientRegistry;
pub use service::{CHART_TOOL, SEARCH_TOOL, StatistaService};
pub use tools::{ChartDataTool, ListToolsTool, SearchStatisticsTool, register_statista_tools};
