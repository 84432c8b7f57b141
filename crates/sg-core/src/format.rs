//! Text rendering for the language model

use serde_json::Value as JsonValue;

use crate::models::{ChartDataset, SearchResultSet, ToolDescriptor};

/// Render search hits, or the "no results" line when there are none
pub fn format_search_results(query: &str, results: &SearchResultSet) -> String {
    if results.is_empty() {
        return no_results(query);
    }

    let blocks: Vec<String> = results
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let premium = if item.is_premium { " [PREMIUM]" } else { "" };
            format!(
                "{}. ID: {}{}\n   Title: {}\n   Subject: {}\n   Link: {}",
                i + 1,
                item.identifier,
                premium,
                item.title,
                item.subject,
                item.link
            )
        })
        .collect();

    format!(
        "Found {} statistics for '{}':\n\n{}\n\nTo get detailed chart data, use get_chart_data(statistic_id) with the ID number.",
        results.total_found,
        query,
        blocks.join("\n\n")
    )
}

pub fn no_results(query: &str) -> String {
    format!("No results found for query: {}", query)
}

/// Render one chart dataset
pub fn format_chart(dataset: &ChartDataset) -> String {
    let mut out = format!("Statistic: {}\nID: {}\n", dataset.title, dataset.id);

    if let Some(date) = &dataset.date {
        out.push_str(&format!("Date: {}\n", date));
    }
    if let Some(description) = &dataset.description {
        out.push_str(&format!("\nDescription: {}\n", description));
    }

    if dataset.point_count() > 0 {
        out.push_str("\nData Points:\n");
        for column in &dataset.series {
            for point in &column.points {
                if point.label.is_empty() {
                    out.push_str(&format!("  - {}\n", display_value(&point.value)));
                } else {
                    out.push_str(&format!(
                        "  - {}: {}\n",
                        point.label,
                        display_value(&point.value)
                    ));
                }
            }
        }
    }

    if !dataset.sources.is_empty() {
        out.push_str("\nSources:\n");
        for source in &dataset.sources {
            if source.subtitle.is_empty() {
                out.push_str(&format!("  - {}\n", source.title));
            } else {
                out.push_str(&format!("  - {}: {}\n", source.subtitle, source.title));
            }
        }
    }

    if let Some(url) = &dataset.url {
        out.push_str(&format!("\nLink: {}\n", url));
    }

    out
}

pub fn unparseable_chart(statistic_id: i64) -> String {
    format!(
        "Chart data retrieved but could not parse structure for statistic ID: {}",
        statistic_id
    )
}

pub fn format_tools(tools: &[ToolDescriptor]) -> String {
    let mut out = String::from("Available Statista Tools:\n\n");
    for tool in tools {
        out.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }
    out
}

/// Strings without quotes, null as empty, everything else as JSON
fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
