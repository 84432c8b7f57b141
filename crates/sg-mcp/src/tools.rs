//! Statista tool adapters
//!
//! [`StatistaService`] の操作を sg-core の Tool trait に適合させるアダプター

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

use sg_core::{
    Error, Outcome, Result, SchemaBuilder, Tool, ToolContext, ToolManager, ToolResult, format,
};

use crate::service::StatistaService;

fn decode<T: for<'de> Deserialize<'de>>(tool: &str, input: JsonValue) -> Result<T> {
    serde_json::from_value(input).map_err(|e| Error::InvalidInput(format!("{}: {}", tool, e)))
}

/// `search_statistics(query, max_results?)`
pub struct SearchStatisticsTool {
    service: Arc<StatistaService>,
    default_max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

impl SearchStatisticsTool {
    pub const NAME: &'static str = "search_statistics";

    pub fn new(service: Arc<StatistaService>, default_max_results: usize) -> Self {
        Self {
            service,
            default_max_results,
        }
    }
}

#[async_trait]
impl Tool for SearchStatisticsTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search Statista's database for statistics matching the query. Covers charts, reports and forecasts across industries and topics. Returns statistic IDs that can be passed to get_chart_data."
    }

    fn input_schema(&self) -> JsonValue {
        SchemaBuilder::object_schema_with_descriptions(vec![
            (
                "query",
                "string",
                "Natural language search query (e.g. \"GDP of Japan\", \"electric vehicle sales\")",
                true,
            ),
            ("max_results", "integer", "Maximum number of results to return (default: 10)", false),
        ])
    }

    async fn execute(&self, input: JsonValue, ctx: &ToolContext) -> Result<ToolResult> {
        let input: SearchInput = decode(Self::NAME, input)?;
        let query = input.query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search_statistics: query must not be empty".into()));
        }
        let max_results = input.max_results.unwrap_or(self.default_max_results);
        if max_results == 0 {
            return Err(Error::InvalidInput(
                "search_statistics: max_results must be at least 1".into(),
            ));
        }

        match self.service.search(ctx, query, max_results).await? {
            Outcome::Data(results) => Ok(ToolResult::success(format::format_search_results(
                query, &results,
            ))),
            Outcome::Empty { reason } => Ok(ToolResult::empty(reason)),
        }
    }
}

/// `get_chart_data(statistic_id)`
pub struct ChartDataTool {
    service: Arc<StatistaService>,
}

/// Statistic ids arrive as numbers or numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatisticId {
    Number(i64),
    Text(String),
}

impl StatisticId {
    fn resolve(self) -> Result<i64> {
        match self {
            StatisticId::Number(id) => Ok(id),
            StatisticId::Text(text) => text.trim().parse().map_err(|_| {
                Error::InvalidInput(format!(
                    "get_chart_data: statistic_id must be a number, got '{}'",
                    text
                ))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartInput {
    statistic_id: StatisticId,
}

impl ChartDataTool {
    pub const NAME: &'static str = "get_chart_data";

    pub fn new(service: Arc<StatistaService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ChartDataTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Retrieve detailed chart data for a specific statistic by ID. Use after searching to get data points, source information and context."
    }

    fn input_schema(&self) -> JsonValue {
        SchemaBuilder::object_schema_with_descriptions(vec![(
            "statistic_id",
            "integer",
            "The unique identifier of the statistic (obtained from search results)",
            true,
        )])
    }

    async fn execute(&self, input: JsonValue, ctx: &ToolContext) -> Result<ToolResult> {
        let input: ChartInput = decode(Self::NAME, input)?;
        let statistic_id = input.statistic_id.resolve()?;

        match self.service.fetch_chart(ctx, statistic_id).await? {
            Outcome::Data(dataset) => Ok(ToolResult::success(format::format_chart(&dataset))),
            Outcome::Empty { reason } => Ok(ToolResult::empty(reason)),
        }
    }
}

/// `get_available_tools()`
pub struct ListToolsTool {
    service: Arc<StatistaService>,
}

impl ListToolsTool {
    pub const NAME: &'static str = "get_available_tools";

    pub fn new(service: Arc<StatistaService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListToolsTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "List all available Statista MCP tools and their capabilities."
    }

    fn input_schema(&self) -> JsonValue {
        SchemaBuilder::object_schema_with_descriptions(vec![])
    }

    async fn execute(&self, _input: JsonValue, _ctx: &ToolContext) -> Result<ToolResult> {
        let tools = self.service.list_tools().await?;
        Ok(ToolResult::success(format::format_tools(&tools)))
    }
}

/// Register the Statista tools with the tool manager
pub fn register_statista_tools(
    manager: &mut ToolManager,
    service: Arc<StatistaService>,
    default_max_results: usize,
) {
    manager.register(Arc::new(SearchStatisticsTool::new(
        Arc::clone(&service),
        default_max_results,
    )));
    manager.register(Arc::new(ChartDataTool::new(Arc::clone(&service))));
    manager.register(Arc::new(ListToolsTool::new(service)));
    info!(tool_count = manager.len(), "Registered Statista tools");
}
