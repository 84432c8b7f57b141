//! `get-chart-data-by-id` replies
//!
//! The reply usually looks like
//! `[metadata, html description, sources, id, url, url]`, but nothing in the
//! payload says which is which. Roles are inferred:
//!
//! * a JSON object with `graphType` is the metadata (first one wins)
//! * a JSON array at [`SOURCES_FRAGMENT_INDEX`] is the source list
//! * non-JSON text starting with `<` is the HTML description
//! * non-JSON text starting with `http` is the link (first one wins)

use scraper::Html;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::models::{ChartDataset, ChartParse, SeriesColumn, SeriesPoint, SourceRef};
use crate::parse::fragment::{MimeHint, RawFragment};
use crate::parse::search::{scalar_to_string, string_field};

/// Position of the sources list in the reply.
///
/// Positional: if the upstream ever reorders its reply, sources stop being
/// recognized.
pub const SOURCES_FRAGMENT_INDEX: usize = 2;

/// Column name used when `data` is a flat list of points
pub const IMPLICIT_COLUMN: &str = "values";

#[derive(Default)]
struct Roles {
    metadata: Option<Map<String, JsonValue>>,
    sources: Option<Vec<JsonValue>>,
    html: Option<String>,
    url: Option<String>,
}

/// Disambiguate a chart reply for `statistic_id`
pub fn parse_chart_dataset<S: AsRef<str>>(fragments: &[S], statistic_id: i64) -> ChartParse {
    let roles = assign_roles(RawFragment::inspect_all(fragments));

    let Some(metadata) = roles.metadata else {
        warn!(statistic_id, "Could not find chart info in response");
        return ChartParse::Unparseable { statistic_id };
    };

    let title = first_present(&metadata, &["title", "name"]).unwrap_or_else(|| "N/A".to_string());
    let date = first_present(&metadata, &["date", "reference_date"]).and_then(non_blank);
    let description = first_present(&metadata, &["description"])
        .and_then(non_blank)
        .or_else(|| roles.html.as_deref().and_then(html_text));

    let series = metadata.get("data").map(normalize_series).unwrap_or_default();
    let sources = roles
        .sources
        .map(|list| list.iter().filter_map(parse_source).collect())
        .unwrap_or_default();

    ChartParse::Parsed(ChartDataset {
        id: statistic_id,
        title,
        date,
        description,
        series,
        sources,
        url: roles.url,
    })
}

fn assign_roles(fragments: Vec<RawFragment>) -> Roles {
    let mut roles = Roles::default();

    for fragment in fragments {
        let index = fragment.index;
        match (fragment.hint, fragment.json) {
            (MimeHint::JsonObject, Some(JsonValue::Object(obj)))
                if obj.contains_key("graphType") =>
            {
                if roles.metadata.is_none() {
                    debug!(index, "Found chart info");
                    roles.metadata = Some(obj);
                }
            }
            (MimeHint::JsonArray, Some(JsonValue::Array(list))) if is_sources_position(index) => {
                debug!(index, "Found sources");
                roles.sources = Some(list);
            }
            (MimeHint::Html, _) => {
                debug!(index, "Found HTML description");
                roles.html = Some(fragment.payload);
            }
            (MimeHint::Url, _) => {
                if roles.url.is_none() {
                    debug!(index, "Found URL");
                    roles.url = Some(fragment.payload);
                }
            }
            _ => {}
        }
    }

    roles
}

fn is_sources_position(index: usize) -> bool {
    index == SOURCES_FRAGMENT_INDEX
}

/// Value of the first key in `keys` that is present, even if empty.
/// Later keys only stand in for absent ones.
fn first_present(obj: &Map<String, JsonValue>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k)).and_then(scalar_to_string)
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Column mapping or flat point list, normalised to ordered columns
fn normalize_series(data: &JsonValue) -> Vec<SeriesColumn> {
    match data {
        JsonValue::Object(columns) => columns
            .iter()
            .filter_map(|(name, points)| {
                let points = points.as_array()?;
                Some(SeriesColumn {
                    name: name.clone(),
                    points: points.iter().map(column_point).collect(),
                })
            })
            .collect(),
        JsonValue::Array(points) if !points.is_empty() => vec![SeriesColumn {
            name: IMPLICIT_COLUMN.to_string(),
            points: points.iter().map(flat_point).collect(),
        }],
        _ => Vec::new(),
    }
}

/// `{"name": label, "data": value}` inside a named column
fn column_point(point: &JsonValue) -> SeriesPoint {
    if !point.is_object() {
        return unlabeled(point);
    }
    SeriesPoint {
        label: string_field(point, "name").unwrap_or_default(),
        value: first_value(point, &["data", "value"]),
    }
}

/// `{"label"|"name"|"category": .., "value"|"data"|"y": ..}` in a flat list
fn flat_point(point: &JsonValue) -> SeriesPoint {
    if !point.is_object() {
        return unlabeled(point);
    }
    let label = ["label", "name", "category"]
        .iter()
        .find_map(|k| string_field(point, k))
        .unwrap_or_default();
    SeriesPoint {
        label,
        value: first_value(point, &["value", "data", "y"]),
    }
}

fn unlabeled(point: &JsonValue) -> SeriesPoint {
    SeriesPoint {
        label: String::new(),
        value: point.clone(),
    }
}

fn first_value(point: &JsonValue, keys: &[&str]) -> JsonValue {
    keys.iter()
        .find_map(|k| point.get(*k))
        .cloned()
        .unwrap_or(JsonValue::Null)
}

fn parse_source(value: &JsonValue) -> Option<SourceRef> {
    value.as_object()?;
    Some(SourceRef {
        title: string_field(value, "title").unwrap_or_default(),
        subtitle: string_field(value, "subtitle").unwrap_or_default(),
    })
}

/// Visible text of an HTML fragment, whitespace collapsed
fn html_text(html: &str) -> Option<String> {
    let document = Html::parse_fragment(html);
    let text = document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() { None } else { Some(text) }
}
