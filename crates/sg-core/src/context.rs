//! Per-session context log
//!
//! Append-only record of the queries a session issued and the datasets it
//! retrieved. The hosting agent reads it back for context replay.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::models::{ChartDataset, SearchResultSet};

/// A search the session issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub results: SearchResultSet,
}

/// A chart the session retrieved. `data` is `None` when the reply was
/// unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub statistic_id: i64,
    pub data: Option<ChartDataset>,
}

/// Context of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextLog {
    #[serde(rename = "statista_searches", default)]
    searches: Vec<SearchRecord>,
    #[serde(rename = "statista_charts", default)]
    charts: Vec<ChartRecord>,
}

impl ContextLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_search(&mut self, query: impl Into<String>, results: SearchResultSet) {
        self.searches.push(SearchRecord {
            query: query.into(),
            results,
        });
    }

    pub fn record_chart(&mut self, statistic_id: i64, data: Option<ChartDataset>) {
        self.charts.push(ChartRecord { statistic_id, data });
    }

    pub fn searches(&self) -> &[SearchRecord] {
        &self.searches
    }

    pub fn charts(&self) -> &[ChartRecord] {
        &self.charts
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty() && self.charts.is_empty()
    }

    /// Move every entry of `other` to the end of this log
    pub fn append(&mut self, mut other: ContextLog) {
        self.searches.append(&mut other.searches);
        self.charts.append(&mut other.charts);
    }
}

/// Shared handle to one session's log
pub type ContextHandle = Arc<Mutex<ContextLog>>;

/// Sessions kept when no limit is configured
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug, Default)]
struct Sessions {
    logs: HashMap<String, ContextHandle>,
    /// Session ids, oldest first
    order: VecDeque<String>,
}

/// Context logs indexed by session id
///
/// Holds at most `max_sessions` logs; storing a new session past that evicts
/// the oldest one.
#[derive(Debug)]
pub struct SessionContexts {
    sessions: RwLock<Sessions>,
    max_sessions: usize,
}

impl SessionContexts {
    pub fn new() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }

    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Log of an existing session
    pub async fn get(&self, session_id: &str) -> Option<ContextHandle> {
        self.sessions.read().await.logs.get(session_id).cloned()
    }

    /// Store `log` under `session_id`
    ///
    /// If the session already exists the entries are appended to its log.
    pub async fn store(&self, session_id: &str, log: ContextLog) {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.logs.get(session_id) {
            existing.lock().await.append(log);
            return;
        }

        debug!(session_id, "Creating context log");
        sessions
            .logs
            .insert(session_id.to_string(), Arc::new(Mutex::new(log)));
        sessions.order.push_back(session_id.to_string());

        while sessions.logs.len() > self.max_sessions {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            debug!(session_id = %oldest, "Evicting context log");
            sessions.logs.remove(&oldest);
        }
    }

    /// Copy of a session's log, if the session exists
    pub async fn snapshot(&self, session_id: &str) -> Option<ContextLog> {
        let handle = self.get(session_id).await?;
        let log = handle.lock().await;
        Some(log.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.logs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.logs.is_empty()
    }
}

impl Default for SessionContexts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut log = ContextLog::new();
        log.record_search("gdp", SearchResultSet::default());
        log.record_chart(7, None);

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["statista_searches"][0]["query"], "gdp");
        assert_eq!(json["statista_charts"][0]["statistic_id"], 7);
        assert!(json["statista_charts"][0]["data"].is_null());
    }

    fn log_with_chart(statistic_id: i64) -> ContextLog {
        let mut log = ContextLog::new();
        log.record_chart(statistic_id, None);
        log
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let contexts = SessionContexts::new();
        let mut searched = ContextLog::new();
        searched.record_search("q1", SearchResultSet::default());
        contexts.store("a", searched).await;
        contexts.store("b", log_with_chart(1)).await;

        let a = contexts.snapshot("a").await.unwrap();
        let b = contexts.snapshot("b").await.unwrap();
        assert_eq!(a.searches().len(), 1);
        assert!(a.charts().is_empty());
        assert_eq!(b.charts().len(), 1);
        assert!(contexts.snapshot("missing").await.is_none());
        assert!(contexts.get("missing").await.is_none());
        assert_eq!(contexts.len().await, 2);
    }

    #[tokio::test]
    async fn test_store_appends_to_existing_session() {
        let contexts = SessionContexts::new();
        for i in 0..3 {
            contexts.store("s", log_with_chart(i)).await;
        }
        let ids: Vec<_> = contexts
            .snapshot("s")
            .await
            .unwrap()
            .charts()
            .iter()
            .map(|c| c.statistic_id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(contexts.len().await, 1);
    }

    #[tokio::test]
    async fn test_oldest_session_is_evicted_at_capacity() {
        let contexts = SessionContexts::with_max_sessions(2);
        contexts.store("first", log_with_chart(1)).await;
        contexts.store("second", log_with_chart(2)).await;
        contexts.store("first", log_with_chart(3)).await;
        assert_eq!(contexts.len().await, 2);

        contexts.store("third", log_with_chart(4)).await;
        assert_eq!(contexts.len().await, 2);
        assert!(contexts.get("first").await.is_none());
        assert!(contexts.get("second").await.is_some());
        assert!(contexts.get("third").await.is_some());
    }
}
