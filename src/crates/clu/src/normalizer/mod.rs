//! Response normalization.
//!
//! Turns a raw `:analyze-conversations` response into a [`RecognizerResult`].
//! Conversation projects are mapped directly. Orchestration projects are
//! unwrapped through the intent named by `topIntent`, whose connected project
//! may be a conversation project, a LUIS application or a question answering
//! knowledge base; each has its own mapping.
//!
//! Normalization is pure: the raw response is only read and a new result is
//! built on every call.
//!
//! # Example
//!
//! ```rust,ignore
//! use clu::normalizer::normalize;
//!
//! let raw: serde_json::Value = serde_json::from_str(&body)?;
//! let result = normalize(&raw, "book a flight to Paris")?;
//! println!("{:?}", result.top_intent());
//! ```

pub mod conversation;
pub mod luis;
pub mod question_answering;

use crate::error::Result;
use crate::prediction::{AnalyzeResponse, ProjectKind, TargetKind};
use crate::result::RecognizerResult;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use luis::{map_properties, normalize_entity_name, normalize_intent_name};
pub use question_answering::QUESTION_ANSWERING_MATCH_INTENT;

/// Normalize a raw service response for `utterance`.
///
/// Fails only when the response has no prediction or no `projectKind`.
/// Unknown project or target kinds leave intents and entities empty.
pub fn normalize(raw: &Value, utterance: &str) -> Result<RecognizerResult> {
    let response = AnalyzeResponse::parse(raw)?;

    let mut result = RecognizerResult::new(utterance);
    result.altered_text = response.query.map(str::to_string);

    let mut target_kind_tag = None;
    match &response.project_kind {
        ProjectKind::Conversation => {
            conversation::apply(response.prediction, &mut result);
        }
        ProjectKind::Orchestration => match response.target() {
            Some(target) => {
                debug!(
                    top_intent = target.name,
                    target_kind = target.kind_tag,
                    "Unwrapping orchestration target"
                );
                target_kind_tag = Some(target.kind_tag);
                match &target.kind {
                    TargetKind::Conversation => match target.nested_prediction() {
                        Some(prediction) => conversation::apply(prediction, &mut result),
                        None => warn!(target = target.name, "Conversation target has no prediction"),
                    },
                    TargetKind::Luis => match target.nested_prediction() {
                        Some(prediction) => luis::apply(prediction, &mut result),
                        None => warn!(target = target.name, "LUIS target has no prediction"),
                    },
                    TargetKind::QuestionAnswering => {
                        question_answering::apply(target.answers(), &mut result);
                    }
                    TargetKind::Unknown(tag) => {
                        debug!(target = target.name, kind = %tag, "Target kind not mapped");
                    }
                }
            }
            None => warn!(
                top_intent = ?response.top_intent,
                "Orchestration prediction has no result for its top intent"
            ),
        },
        ProjectKind::Unknown(tag) => {
            warn!(project_kind = %tag, "Unrecognized project kind, returning empty result");
        }
    }

    add_properties(&response, target_kind_tag, &mut result.properties);
    Ok(result)
}

fn add_properties(
    response: &AnalyzeResponse<'_>,
    target_kind_tag: Option<&str>,
    properties: &mut Map<String, Value>,
) {
    properties.insert(
        "projectKind".to_string(),
        Value::String(response.project_kind_tag.to_string()),
    );

    if let Some(top_intent) = response.top_intent {
        properties.insert("topIntent".to_string(), Value::String(top_intent.to_string()));
    }

    if let Some(language) = response.detected_language {
        properties.insert(
            "detectedLanguage".to_string(),
            Value::String(language.to_string()),
        );
    }

    if let Some(tag) = target_kind_tag {
        properties.insert("targetIntentKind".to_string(), Value::String(tag.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CluError;
    use serde_json::json;

    #[test]
    fn test_conversation_properties() {
        let raw = json!({
            "kind": "ConversationResult",
            "result": {
                "query": "Book a flight",
                "detectedLanguage": "en",
                "prediction": {
                    "topIntent": "BookFlight",
                    "projectKind": "Conversation",
                    "intents": [{"category": "BookFlight", "confidenceScore": 0.9}],
                    "entities": []
                }
            }
        });

        let result = normalize(&raw, "book a flight").unwrap();
        assert_eq!(result.text, "book a flight");
        assert_eq!(result.altered_text.as_deref(), Some("Book a flight"));
        assert_eq!(result.property("projectKind"), Some(&json!("Conversation")));
        assert_eq!(result.property("topIntent"), Some(&json!("BookFlight")));
        assert_eq!(result.property("detectedLanguage"), Some(&json!("en")));
        assert!(result.property("targetIntentKind").is_none());
    }

    #[test]
    fn test_unknown_project_kind_is_soft() {
        let raw = json!({"prediction": {"projectKind": "Summarization", "topIntent": "x"}});
        let result = normalize(&raw, "hello").unwrap();
        assert!(result.intents.is_empty());
        assert!(result.entities.is_empty());
        assert_eq!(result.property("projectKind"), Some(&json!("Summarization")));
    }

    #[test]
    fn test_unknown_target_kind_is_soft() {
        let raw = json!({"result": {"prediction": {
            "projectKind": "Orchestration",
            "topIntent": "None",
            "intents": {"None": {"targetProjectKind": "NonLinked", "confidenceScore": 0.3}}
        }}});
        let result = normalize(&raw, "blah").unwrap();
        assert!(result.intents.is_empty());
        assert_eq!(result.property("targetIntentKind"), Some(&json!("NonLinked")));
    }

    #[test]
    fn test_workflow_project_is_unwrapped_like_orchestration() {
        let raw = json!({"result": {
            "query": "turn on the lights",
            "prediction": {
                "projectKind": "Workflow",
                "topIntent": "Home",
                "intents": {"Home": {
                    "targetKind": "luis",
                    "confidenceScore": 0.8,
                    "result": {"prediction": {
                        "intents": {"Lights.On": {"score": 0.93}},
                        "entities": {}
                    }}
                }}
            }
        }});
        let result = normalize(&raw, "turn on the lights").unwrap();
        assert_eq!(result.intents.get("Lights_On").map(|i| i.score), Some(0.93));
        assert_eq!(result.property("projectKind"), Some(&json!("Workflow")));
        assert_eq!(result.property("targetIntentKind"), Some(&json!("luis")));
        assert!(result.property("luisResult").is_some());
    }

    #[test]
    fn test_orchestration_without_matching_target() {
        let raw = json!({"prediction": {"projectKind": "Orchestration", "topIntent": "Gone", "intents": {}}});
        let result = normalize(&raw, "blah").unwrap();
        assert!(result.intents.is_empty());
        assert!(result.property("targetIntentKind").is_none());
        assert_eq!(result.property("topIntent"), Some(&json!("Gone")));
    }

    #[test]
    fn test_missing_prediction_fails() {
        let raw = json!({"kind": "ConversationResult", "result": {}});
        assert!(matches!(
            normalize(&raw, "hi"),
            Err(CluError::MalformedResponse(_))
        ));
    }
}
