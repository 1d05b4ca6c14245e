//! LUIS predictions returned by orchestration projects.
//!
//! The result follows the layout of the LUIS recognizer: intent names are
//! normalized, and the entity tree is rebuilt by [`map_properties`] so that
//! datetime entities collapse to their timex values, geography entities
//! collapse to `{location, type}`, and `$instance` metadata carries
//! `endIndex` instead of `length`.

use crate::result::RecognizerResult;
use serde_json::{Map, Value};

const INSTANCE_KEY: &str = "$instance";

const DATE_SUBTYPES: &[&str] = &[
    "date",
    "daterange",
    "datetime",
    "datetimerange",
    "duration",
    "set",
    "time",
    "timerange",
];

const GEOGRAPHY_SUBTYPES: &[&str] = &["poi", "city", "countryRegion", "continent", "state"];

pub(crate) fn apply(prediction: &Map<String, Value>, result: &mut RecognizerResult) {
    if let Some(intents) = prediction.get("intents").and_then(Value::as_object) {
        for (name, intent) in intents {
            let score = intent.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            result.intents.insert(normalize_intent_name(name), score);
        }
    }

    if let Some(entities) = prediction.get("entities") {
        if let Value::Object(mapped) = map_properties(entities, false) {
            result.entities = mapped;
        }
    }

    if let Some(sentiment) = prediction.get("sentiment").filter(|s| !s.is_null()) {
        let mut summary = Map::new();
        summary.insert(
            "label".to_string(),
            sentiment.get("label").cloned().unwrap_or(Value::Null),
        );
        summary.insert(
            "score".to_string(),
            sentiment.get("score").cloned().unwrap_or(Value::Null),
        );
        result
            .properties
            .insert("sentiment".to_string(), Value::Object(summary));
    }

    result
        .properties
        .insert("luisResult".to_string(), Value::Object(prediction.clone()));
}

/// `Book.Flight now` → `Book_Flight_now`.
pub fn normalize_intent_name(name: &str) -> String {
    name.replace(['.', ' '], "_")
}

/// Drops a `Type::` prefix (`Type::Role` → `Role`) and normalizes like an
/// intent name.
pub fn normalize_entity_name(name: &str) -> String {
    let role = name.rsplit(':').next().unwrap_or(name);
    normalize_intent_name(role)
}

/// Rebuild a LUIS entity subtree.
///
/// `in_instance` is true below a `$instance` key.
pub fn map_properties(source: &Value, in_instance: bool) -> Value {
    match source {
        Value::Object(object) => Value::Object(map_object(object, in_instance)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match geography_subtype(item) {
                    Some(subtype) if !in_instance => collapse_geography(item, subtype),
                    _ => map_properties(item, in_instance),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn map_object(object: &Map<String, Value>, in_instance: bool) -> Map<String, Value> {
    if !in_instance {
        if let Some(Value::String(kind)) = object.get("type") {
            if DATE_SUBTYPES.contains(&kind.as_str()) {
                return collapse_datetime(object, kind);
            }
        }
    }

    let mut mapped = Map::new();
    for (key, value) in object {
        let name = normalize_entity_name(key);
        let child = map_properties(value, in_instance || key == INSTANCE_KEY);

        if name == "datetime" && value.is_array() {
            mapped.insert("datetimeV1".to_string(), child);
        } else if name == "datetimeV2" && value.is_array() {
            mapped.insert("datetime".to_string(), child);
        } else if in_instance {
            if name == "length" && is_integer(value) {
                match end_index(object, value) {
                    Some(end) => mapped.insert("endIndex".to_string(), Value::from(end)),
                    None => mapped.insert(name, child),
                };
            } else if !((name == "modelTypeId" && is_integer(value))
                || (name == "role" && value.is_string()))
            {
                mapped.insert(name, child);
            }
        } else if name == "unit" && value.is_string() {
            mapped.insert("units".to_string(), child);
        } else {
            mapped.insert(name, child);
        }
    }
    mapped
}

/// `{type, values: [{timex}, ...]}` → `{timex: [distinct timex], type}`.
fn collapse_datetime(object: &Map<String, Value>, kind: &str) -> Map<String, Value> {
    let mut collapsed = Map::new();

    if let Some(values) = object.get("values").and_then(Value::as_array) {
        let mut timex: Vec<Value> = Vec::new();
        for value in values {
            if let Some(t) = value.get("timex").and_then(Value::as_str) {
                let t = Value::String(t.to_string());
                if !timex.contains(&t) {
                    timex.push(t);
                }
            }
        }
        collapsed.insert("timex".to_string(), Value::Array(timex));
    }

    collapsed.insert("type".to_string(), Value::String(kind.to_string()));
    collapsed
}

/// Geography subtype of an array element, taken from the first property whose
/// name contains `type` and whose value is a known subtype.
fn geography_subtype(item: &Value) -> Option<&str> {
    item.as_object()?
        .iter()
        .filter(|(name, _)| name.contains("type"))
        .filter_map(|(_, value)| value.as_str())
        .find(|value| GEOGRAPHY_SUBTYPES.contains(value))
}

fn collapse_geography(item: &Value, subtype: &str) -> Value {
    let mut geo = Map::new();
    if let Some(location) = item
        .as_object()
        .and_then(|object| object.iter().find(|(name, _)| name.contains("value")))
        .map(|(_, value)| value.clone())
    {
        geo.insert("location".to_string(), location);
    }
    geo.insert("type".to_string(), Value::String(subtype.to_string()));
    Value::Object(geo)
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

fn end_index(object: &Map<String, Value>, length: &Value) -> Option<i64> {
    let start = object.get("startIndex")?.as_i64()?;
    length.as_i64()?.checked_add(start)
}
