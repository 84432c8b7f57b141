//! `search-statistics` replies

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::models::{SearchResultItem, SearchResultSet};

/// Parse a search reply into at most `max_results` items
///
/// Only the first fragment is read. It may be `{"items": [...]}` or a bare
/// list. Anything else gives an empty set.
pub fn parse_search_result<S: AsRef<str>>(fragments: &[S], max_results: usize) -> SearchResultSet {
    let Some(first) = fragments.first() else {
        debug!("Search reply has no fragments");
        return SearchResultSet::default();
    };

    let data: JsonValue = match serde_json::from_str(first.as_ref()) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Failed to parse search results as JSON");
            return SearchResultSet::default();
        }
    };

    let items = match &data {
        JsonValue::Object(obj) => obj.get("items").and_then(JsonValue::as_array),
        JsonValue::Array(list) => Some(list),
        _ => None,
    };

    let Some(items) = items else {
        warn!("Search reply carries no item list");
        return SearchResultSet::default();
    };

    let parsed: Vec<SearchResultItem> = items.iter().filter_map(parse_item).collect();
    let total_found = parsed.len();

    debug!(total_found, max_results, "Parsed search results");

    SearchResultSet {
        items: parsed.into_iter().take(max_results).collect(),
        total_found,
    }
}

fn parse_item(value: &JsonValue) -> Option<SearchResultItem> {
    let obj = value.as_object()?;

    // Statista uses `identifier`, older payloads `id`
    let identifier = obj
        .get("identifier")
        .or_else(|| obj.get("id"))
        .and_then(scalar_to_string)
        .unwrap_or_else(|| "N/A".to_string());

    Some(SearchResultItem {
        identifier,
        title: string_field(value, "title").unwrap_or_else(|| "N/A".to_string()),
        subject: string_field(value, "subject").unwrap_or_default(),
        is_premium: obj.get("is_premium").is_some_and(flag),
        link: string_field(value, "link").unwrap_or_default(),
    })
}

/// Loose boolean: `true`, non-zero numbers and `"true"`/`"yes"`/`"1"` strings
fn flag(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        _ => false,
    }
}

pub(crate) fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_to_string)
}

/// Strings as-is, numbers stringified, everything else absent
pub(crate) fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_item_defaults() {
        let set = parse_search_result(
            &[r#"{"items":[{"identifier":"123","title":"GDP of Japan"}]}"#],
            10,
        );
        assert_eq!(set.len(), 1);
        assert_eq!(set.items[0].identifier, "123");
        assert_eq!(set.items[0].title, "GDP of Japan");
        assert!(!set.items[0].is_premium);
        assert_eq!(set.items[0].subject, "");
        assert_eq!(set.items[0].link, "");
    }

    #[test]
    fn test_empty_items_is_empty_set() {
        let set = parse_search_result(&[r#"{"items":[]}"#], 10);
        assert!(set.is_empty());
        assert_eq!(set.total_found, 0);
    }

    #[test]
    fn test_bare_list_and_id_fallback() {
        let set = parse_search_result(
            &[r#"[{"id":42,"title":"A","is_premium":true},{"identifier":"7","title":"B"}]"#],
            10,
        );
        let ids: Vec<_> = set.items.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["42", "7"]);
        assert!(set.items[0].is_premium);
    }

    #[test]
    fn test_premium_flag_accepts_loose_values() {
        let payload = r#"{"items":[
            {"identifier":"1","is_premium":1},
            {"identifier":"2","is_premium":"true"},
            {"identifier":"3","is_premium":"false"},
            {"identifier":"4","is_premium":0},
            {"identifier":"5","is_premium":null}
        ]}"#;
        let flags: Vec<_> = parse_search_result(&[payload], 10)
            .items
            .iter()
            .map(|i| i.is_premium)
            .collect();
        assert_eq!(flags, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_truncates_and_keeps_order() {
        let payload = r#"{"items":[
            {"identifier":"3"},{"identifier":"1"},{"identifier":"2"}
        ]}"#;
        let set = parse_search_result(&[payload], 2);
        let ids: Vec<_> = set.items.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(set.total_found, 3);
    }

    #[test]
    fn test_missing_or_invalid_first_fragment() {
        let none: [&str; 0] = [];
        assert!(parse_search_result(&none, 10).is_empty());
        assert!(parse_search_result(&["No statistics matched"], 10).is_empty());
        assert!(parse_search_result(&[r#"{"total":0}"#], 10).is_empty());
    }

    #[test]
    fn test_only_first_fragment_is_read() {
        let set = parse_search_result(&["oops", r#"{"items":[{"identifier":"1"}]}"#], 10);
        assert!(set.is_empty());
    }
}
