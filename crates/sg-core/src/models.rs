//! Typed results of the Statista tools

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One hit from `search-statistics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub identifier: String,
    pub title: String,
    pub subject: String,
    pub is_premium: bool,
    pub link: String,
}

/// Search hits in upstream relevance order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Items after truncation to the requested maximum
    pub items: Vec<SearchResultItem>,
    /// Number of items the upstream returned before truncation
    pub total_found: usize,
}

impl SearchResultSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// A labelled value inside a chart column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    /// Number or string, exactly as the upstream sent it
    pub value: JsonValue,
}

/// A named chart column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// Source attribution for a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub subtitle: String,
}

/// Chart data for one statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub id: i64,
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    /// Columns in payload order
    pub series: Vec<SeriesColumn>,
    pub sources: Vec<SourceRef>,
    pub url: Option<String>,
}

impl ChartDataset {
    /// Find a column by its upstream name
    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.series.iter().find(|c| c.name == name)
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|c| c.points.len()).sum()
    }
}

/// Result of disambiguating a chart-data reply
#[derive(Debug, Clone, PartialEq)]
pub enum ChartParse {
    Parsed(ChartDataset),
    /// No metadata fragment was found
    Unparseable { statistic_id: i64 },
}

/// Successful call outcome: data, or a well-formed "nothing here"
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Data(T),
    Empty { reason: String },
}

impl<T> Outcome<T> {
    pub fn empty(reason: impl Into<String>) -> Self {
        Outcome::Empty {
            reason: reason.into(),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Data(d) => Some(d),
            Outcome::Empty { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty { .. })
    }
}

/// Name and description of a remote tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}
