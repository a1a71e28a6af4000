//! Brace-delimited JSON recovery from free-text model output

use serde_json::Value;

/// Extract a JSON object from an arbitrary completion string.
///
/// Takes the substring between the first `{` and the last `}` and parses
/// it. Returns `None` when either brace is missing, the first `{` comes
/// after the last `}`, or the slice is not valid JSON.
///
/// Deliberately lenient: there is no brace-balance scan, so a completion
/// with several top-level fragments or stray braces in prose can produce
/// a slice that fails to parse (or parses into the wrong object). Parse
/// failure is reported as `None`, never as an error.
pub fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }

    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "Failed to decode JSON from model output");
            None
        }
    }
}

/// Read a string-array field from an extracted object.
///
/// Non-string entries are skipped rather than failing the whole list.
pub fn string_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_delimited_by_outermost_braces() {
        let text = "Here you go:\n{\"words\": [\"cat\", \"dog\"]}\nHope that helps!";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"words": ["cat", "dog"]}));
    }

    #[test]
    fn extraction_equals_direct_parse_for_clean_object() {
        let raw = r#"{"a": 1, "b": {"c": [2, 3]}}"#;
        assert_eq!(
            extract_json(raw).unwrap(),
            serde_json::from_str::<Value>(raw).unwrap()
        );
    }

    #[test]
    fn missing_braces_yield_none() {
        assert!(extract_json("no json here").is_none());
        assert!(extract_json("only opens {").is_none());
        assert!(extract_json("only closes }").is_none());
    }

    #[test]
    fn open_after_close_yields_none() {
        assert!(extract_json("} inverted {").is_none());
    }

    #[test]
    fn unparseable_slice_yields_none() {
        // Two top-level fragments: the two-index slice spans both and fails
        assert!(extract_json(r#"{"a": 1} and {"b": 2}"#).is_none());
        assert!(extract_json("{not valid json}").is_none());
    }

    #[test]
    fn reextracting_reserialized_output_is_idempotent() {
        let text = "prefix {\"words_pt\": [\"gato\"], \"words_en\": [\"cat\"]} suffix";
        let first = extract_json(text).unwrap();
        let second = extract_json(&first.to_string()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn string_list_skips_non_string_entries() {
        let value = json!({"topics": ["animals", 5, "colors", null]});
        assert_eq!(string_list(&value, "topics"), vec!["animals", "colors"]);
        assert!(string_list(&value, "missing").is_empty());
        assert!(string_list(&json!({"topics": "not a list"}), "topics").is_empty());
    }
}
