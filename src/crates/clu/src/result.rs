//! The normalized recognizer result handed to dialog code.

use crate::entity::CluEntity;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Confidence attached to one intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub score: f64,
}

impl IntentScore {
    pub fn new(score: f64) -> Self {
        Self { score }
    }
}

/// Insertion-ordered map from intent name to score.
///
/// Inserting an existing name replaces its score and keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentMap {
    entries: Vec<(String, IntentScore)>,
}

impl IntentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, score: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => slot.score = score,
            None => self.entries.push((name, IntentScore::new(score))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&IntentScore> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, score)| score)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IntentScore)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), score))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Highest scoring intent; the first one wins on ties.
    pub fn top(&self) -> Option<(&str, f64)> {
        let mut top: Option<(&str, f64)> = None;
        for (name, score) in self.iter() {
            match top {
                Some((_, best)) if score.score <= best => {}
                _ => top = Some((name, score.score)),
            }
        }
        top
    }
}

impl Serialize for IntentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IntentMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IntentMapVisitor;

        impl<'de> Visitor<'de> for IntentMapVisitor {
            type Value = IntentMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of intent name to {\"score\": number}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<IntentMap, A::Error> {
                let mut intents = IntentMap::new();
                while let Some((name, score)) = access.next_entry::<String, IntentScore>()? {
                    intents.insert(name, score.score);
                }
                Ok(intents)
            }
        }

        deserializer.deserialize_map(IntentMapVisitor)
    }
}

/// Canonical recognizer result.
///
/// `entities` always holds an `entities` array for conversation results;
/// question answering results hold an `answer` array instead, and LUIS
/// results hold the remapped LUIS entity object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizerResult {
    /// Utterance as sent to the service.
    pub text: String,

    /// Query text as echoed back by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altered_text: Option<String>,

    #[serde(default)]
    pub intents: IntentMap,

    #[serde(default)]
    pub entities: Map<String, Value>,

    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl RecognizerResult {
    /// Empty result for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            altered_text: None,
            intents: IntentMap::new(),
            entities: Map::new(),
            properties: Map::new(),
        }
    }

    /// Highest scoring intent and its score.
    pub fn top_intent(&self) -> Option<(&str, f64)> {
        self.intents.top()
    }

    /// Name of the highest scoring intent, or `default` if it scores below
    /// `min_score` or there are no intents.
    pub fn top_intent_or<'a>(&'a self, default: &'a str, min_score: f64) -> &'a str {
        match self.top_intent() {
            Some((name, score)) if score >= min_score => name,
            _ => default,
        }
    }

    /// Typed view over `entities.entities`. Items that do not look like a
    /// conversation entity are skipped.
    pub fn conversation_entities(&self) -> Vec<CluEntity> {
        match self.entities.get("entities") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// First entity of `category`.
    pub fn entity(&self, category: &str) -> Option<CluEntity> {
        self.conversation_entities()
            .into_iter()
            .find(|entity| entity.category == category)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Conversion from a [`RecognizerResult`] into an application-specific type.
///
/// ```rust,ignore
/// struct FlightBooking { from: Option<String>, to: Option<String> }
///
/// impl RecognizerConvert for FlightBooking {
///     fn convert(result: &RecognizerResult) -> Self {
///         Self {
///             from: result.entity("fromCity").map(|e| e.text),
///             to: result.entity("toCity").map(|e| e.text),
///         }
///     }
/// }
/// ```
pub trait RecognizerConvert: Sized {
    fn convert(result: &RecognizerResult) -> Self;
}

impl RecognizerConvert for RecognizerResult {
    fn convert(result: &RecognizerResult) -> Self {
        result.clone()
    }
}
