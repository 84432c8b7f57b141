//! Statista tool operations
//!
//! 検索・チャート取得・ツール一覧の各操作。リトライ、エラー分類、
//! セッションのコンテキストログへの記録をまとめて行います。

use std::future::Future;
use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::{debug, info, warn};

use sg_core::{
    ChartDataset, ChartParse, ClassifiedError, ErrorClassifier, Outcome, RetryPolicy,
    SearchResultSet, ToolContext, ToolDescriptor, format, parse_chart_dataset, parse_search_result,
};

use crate::invoker::RemoteToolInvoker;
use crate::registry::SharedClientRegistry;

/// Remote tool for catalog search
pub const SEARCH_TOOL: &str = "search-statistics";
/// Remote tool for chart data
pub const CHART_TOOL: &str = "get-chart-data-by-id";

const SEARCH_OPERATION: &str = "searching Statista";
const CHART_OPERATION: &str = "retrieving chart data";
const LIST_OPERATION: &str = "listing tools";

pub struct StatistaService {
    registry: Arc<SharedClientRegistry>,
    classifier: ErrorClassifier,
    retry: RetryPolicy,
}

impl StatistaService {
    /// Service using the registry's configured retry policy
    pub fn new(registry: Arc<SharedClientRegistry>) -> Self {
        let retry = registry.config().retry_policy();
        Self::with_retry(registry, retry)
    }

    pub fn with_retry(registry: Arc<SharedClientRegistry>, retry: RetryPolicy) -> Self {
        Self {
            registry,
            classifier: ErrorClassifier::new(),
            retry,
        }
    }

    pub fn registry(&self) -> &Arc<SharedClientRegistry> {
        &self.registry
    }

    /// Search the catalog and log the query for the session
    pub async fn search(
        &self,
        ctx: &ToolContext,
        query: &str,
        max_results: usize,
    ) -> Result<Outcome<SearchResultSet>, ClassifiedError> {
        info!(session_id = %ctx.session_id, query, max_results, "Searching Statista");

        let args = json!({ "query": query });
        let fragments = self
            .call(SEARCH_OPERATION, |invoker| {
                let args = args.clone();
                async move { invoker.invoke(SEARCH_TOOL, args).await }
            })
            .await?;

        let results = parse_search_result(&fragments, max_results);
        debug!(returned = results.len(), total_found = results.total_found, "Search completed");

        ctx.log.lock().await.record_search(query, results.clone());

        if results.is_empty() {
            Ok(Outcome::empty(format::no_results(query)))
        } else {
            Ok(Outcome::Data(results))
        }
    }

    /// Fetch chart data for one statistic and log it for the session
    pub async fn fetch_chart(
        &self,
        ctx: &ToolContext,
        statistic_id: i64,
    ) -> Result<Outcome<ChartDataset>, ClassifiedError> {
        info!(session_id = %ctx.session_id, statistic_id, "Retrieving chart data");

        let args = json!({ "id": statistic_id });
        let fragments = self
            .call(CHART_OPERATION, |invoker| {
                let args = args.clone();
                async move { invoker.invoke(CHART_TOOL, args).await }
            })
            .await?;

        match parse_chart_dataset(&fragments, statistic_id) {
            ChartParse::Parsed(dataset) => {
                debug!(statistic_id, points = dataset.point_count(), "Chart data parsed");
                ctx.log.lock().await.record_chart(statistic_id, Some(dataset.clone()));
                Ok(Outcome::Data(dataset))
            }
            ChartParse::Unparseable { statistic_id } => {
                warn!(statistic_id, fragments = fragments.len(), "Chart reply had no metadata");
                ctx.log.lock().await.record_chart(statistic_id, None);
                Ok(Outcome::empty(format::unparseable_chart(statistic_id)))
            }
        }
    }

    /// Tools the remote catalog offers
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ClassifiedError> {
        info!("Listing Statista tools");
        self.call(LIST_OPERATION, |invoker| async move { invoker.list_tools().await })
            .await
    }

    /// Obtain the invoker, run `f` under the retry policy, classify failures
    async fn call<T, F, Fut>(&self, operation: &str, f: F) -> Result<T, ClassifiedError>
    where
        F: Fn(Arc<dyn RemoteToolInvoker>) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let f = &f;
        self.retry
            .run(operation, move || async move {
                let invoker = self.registry.get_or_create().await?;
                f(invoker).await.map_err(|e| self.classifier.classify(operation, e))
            })
            .await
    }
}
