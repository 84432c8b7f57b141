//! sg-core: statgate core library
//!
//! Statista MCP の応答解析、エラー分類、プロトコルエラー変換、
//! セッションごとのコンテキストログを提供します。

pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod models;
pub mod parse;
pub mod protocol;
pub mod retry;
pub mod tool;

pub use classify::{
    CLASSIFICATION_RULES, ClassificationRule, ClassifiedError, DomainErrorKind, ErrorClassifier,
};
pub use config::{ApiConfig, Config, StatistaConfig};
pub use context::{ContextHandle, ContextLog, DEFAULT_MAX_SESSIONS, SessionContexts};
pub use error::{Error, Result};
pub use models::{
    ChartDataset, ChartParse, Outcome, SearchResultItem, SearchResultSet, SeriesColumn, SeriesPoint,
    SourceRef,
    ToolDescriptor,
};
pub use parse::{parse_chart_dataset, parse_search_result};
pub use protocol::{envelope_for, to_envelope, ProtocolErrorEnvelope};
pub use retry::RetryPolicy;
pub use tool::{SchemaBuilder, Tool, ToolContext, ToolDefinition, ToolManager, ToolResult};
