//! Response disambiguation
//!
//! Statista tools answer with an untagged, ordered list of text fragments.
//! This module works out what each fragment is and builds typed records.
//! Nothing here returns an error: malformed fragments are skipped and the
//! caller always gets a best-effort record.

pub mod chart;
pub mod fragment;
pub mod search;

pub use chart::{parse_chart_dataset, IMPLICIT_COLUMN, SOURCES_FRAGMENT_INDEX};
pub use fragment::{MimeHint, RawFragment};
pub use search::parse_search_result;
