//! Typed conversation entities and UTF-16 span handling.
//!
//! Requests are sent with `stringIndexType = Utf16CodeUnit`, so `offset` and
//! `length` count UTF-16 code units. Rust strings are UTF-8; use
//! [`utf16_span_to_byte_range`] or [`CluEntity::span_in`] before slicing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Range;

/// A conversation-project entity as found under `entities.entities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CluEntity {
    pub category: String,
    pub text: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolutions: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_information: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CluEntity {
    /// The part of `text` this entity covers.
    pub fn span_in<'a>(&self, text: &'a str) -> Option<&'a str> {
        utf16_span_to_byte_range(text, self.offset, self.length).map(|range| &text[range])
    }

    /// First `timex` found in the entity's resolutions.
    pub fn timex(&self) -> Option<&str> {
        self.resolutions
            .iter()
            .find_map(|resolution| resolution.get("timex").and_then(Value::as_str))
    }

    /// Resolutions whose `resolutionKind` equals `kind`.
    pub fn resolutions_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Value> {
        self.resolutions.iter().filter(move |resolution| {
            resolution.get("resolutionKind").and_then(Value::as_str) == Some(kind)
        })
    }
}

/// Convert a UTF-16 `offset`/`length` pair into a byte range of `text`.
///
/// Returns `None` if the span runs past the end of `text` or if either end
/// falls inside a surrogate pair.
pub fn utf16_span_to_byte_range(text: &str, offset: usize, length: usize) -> Option<Range<usize>> {
    let end_units = offset.checked_add(length)?;
    let start = utf16_to_byte_index(text, offset)?;
    let end = utf16_to_byte_index(text, end_units)?;
    Some(start..end)
}

fn utf16_to_byte_index(text: &str, target: usize) -> Option<usize> {
    let mut units = 0;
    for (byte_index, ch) in text.char_indices() {
        if units == target {
            return Some(byte_index);
        }
        if units > target {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == target).then_some(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ascii_span() {
        assert_eq!(utf16_span_to_byte_range("fly to Paris", 7, 5), Some(7..12));
    }

    #[test]
    fn test_span_after_multibyte_chars() {
        // "é" is 2 bytes / 1 unit, "😀" is 4 bytes / 2 units
        let text = "café 😀 Paris";
        let range = utf16_span_to_byte_range(text, 8, 5).unwrap();
        assert_eq!(&text[range], "Paris");
    }

    #[test]
    fn test_span_inside_surrogate_pair_is_rejected() {
        assert_eq!(utf16_span_to_byte_range("😀x", 1, 1), None);
    }

    #[test]
    fn test_span_out_of_bounds() {
        assert_eq!(utf16_span_to_byte_range("abc", 2, 5), None);
        assert_eq!(utf16_span_to_byte_range("abc", 3, 0), Some(3..3));
    }

    #[test]
    fn test_entity_from_service_json() {
        let entity: CluEntity = serde_json::from_value(json!({
            "category": "flightDate",
            "text": "tomorrow",
            "offset": 14,
            "length": 8,
            "confidenceScore": 1,
            "resolutions": [
                {"resolutionKind": "DateTimeResolution", "dateTimeSubKind": "Date", "timex": "2023-03-02", "value": "2023-03-02"}
            ],
            "multipleResolutions": false
        }))
        .unwrap();

        assert_eq!(entity.timex(), Some("2023-03-02"));
        assert_eq!(entity.resolutions_of_kind("DateTimeResolution").count(), 1);
        assert_eq!(entity.extra.get("multipleResolutions"), Some(&json!(false)));
        assert_eq!(entity.span_in("book a flight tomorrow"), Some("tomorrow"));
    }
}
