//! Conversation project predictions.
//!
//! Intents keep the service's category names and order. Entities are passed
//! through untouched under `entities.entities`.

use crate::result::RecognizerResult;
use serde_json::{Map, Value};

pub(crate) fn apply(prediction: &Map<String, Value>, result: &mut RecognizerResult) {
    if let Some(intents) = prediction.get("intents").and_then(Value::as_array) {
        for intent in intents {
            let Some(category) = intent.get("category").and_then(Value::as_str) else {
                continue;
            };
            let score = intent
                .get("confidenceScore")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            result.intents.insert(category, score);
        }
    }

    let entities = match prediction.get("entities") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    result
        .entities
        .insert("entities".to_string(), Value::Array(entities));
}
