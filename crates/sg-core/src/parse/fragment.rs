//! Fragment shape detection

use serde_json::Value as JsonValue;

/// Shape of a fragment's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeHint {
    JsonObject,
    JsonArray,
    Html,
    Url,
    Unrecognized,
}

/// One fragment of a multi-part tool reply, with its shape worked out
#[derive(Debug, Clone)]
pub struct RawFragment {
    pub index: usize,
    pub hint: MimeHint,
    pub payload: String,
    /// Parsed value for JSON objects and arrays
    pub json: Option<JsonValue>,
}

impl RawFragment {
    /// Inspect the fragment at `index`
    ///
    /// JSON scalars (a bare number or string) count as unrecognized.
    pub fn inspect(index: usize, payload: impl Into<String>) -> Self {
        let payload = payload.into();

        let (hint, json) = match serde_json::from_str::<JsonValue>(&payload) {
            Ok(value @ JsonValue::Object(_)) => (MimeHint::JsonObject, Some(value)),
            Ok(value @ JsonValue::Array(_)) => (MimeHint::JsonArray, Some(value)),
            Ok(_) => (MimeHint::Unrecognized, None),
            Err(_) if payload.starts_with('<') => (MimeHint::Html, None),
            Err(_) if payload.starts_with("http") => (MimeHint::Url, None),
            Err(_) => (MimeHint::Unrecognized, None),
        };

        Self {
            index,
            hint,
            payload,
            json,
        }
    }

    /// Inspect every fragment, keeping positions
    pub fn inspect_all<S: AsRef<str>>(fragments: &[S]) -> Vec<Self> {
        fragments
            .iter()
            .enumerate()
            .map(|(i, f)| Self::inspect(i, f.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        assert_eq!(RawFragment::inspect(0, r#"{"a":1}"#).hint, MimeHint::JsonObject);
        assert_eq!(RawFragment::inspect(0, "[1,2]").hint, MimeHint::JsonArray);
        assert_eq!(RawFragment::inspect(0, "<p>hi</p>").hint, MimeHint::Html);
        assert_eq!(RawFragment::inspect(0, "https://x.test/1").hint, MimeHint::Url);
        assert_eq!(RawFragment::inspect(0, "plain words").hint, MimeHint::Unrecognized);
        assert_eq!(RawFragment::inspect(0, "").hint, MimeHint::Unrecognized);
    }

    #[test]
    fn test_json_scalar_is_unrecognized() {
        let fragment = RawFragment::inspect(3, "12345");
        assert_eq!(fragment.hint, MimeHint::Unrecognized);
        assert!(fragment.json.is_none());
    }

    #[test]
    fn test_broken_json_falls_through() {
        assert_eq!(RawFragment::inspect(0, "{not json").hint, MimeHint::Unrecognized);
        assert_eq!(RawFragment::inspect(0, "<{\"graphType\"").hint, MimeHint::Html);
    }

    #[test]
    fn test_inspect_all_keeps_positions() {
        let fragments = RawFragment::inspect_all(&["{}", "x", "[]"]);
        let indexes: Vec<_> = fragments.iter().map(|f| f.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }
}
