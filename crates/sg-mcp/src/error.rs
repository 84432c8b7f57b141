//! エラー型定義 (sg-mcp)

use std::time::Duration;

use thiserror::Error;

/// Failures of the MCP transport
///
/// These are opaque to callers: the service hands them to the classifier,
/// which only looks at the rendered message.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to connect to MCP server: {0}")]
    Connect(String),

    #[error("Tool call failed: {0}")]
    Transport(String),

    /// The server answered with `isError: true`
    #[error("Tool '{tool}' returned an error: {message}")]
    Declared { tool: String, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, InvokeError>;
