//! Question answering results returned by orchestration projects.
//!
//! Shaped like the QnA Maker recognizer output: a single
//! `QuestionAnsweringMatch` intent scored by the best answer,
//! `entities.answer` holding that answer, and every answer under
//! `properties.answers`.

use crate::result::RecognizerResult;
use serde_json::Value;

/// Intent reported when the knowledge base returned an answer.
pub const QUESTION_ANSWERING_MATCH_INTENT: &str = "QuestionAnsweringMatch";

/// Intent reported when the knowledge base returned nothing.
pub const NONE_INTENT: &str = "None";

pub(crate) fn apply(answers: Option<&Vec<Value>>, result: &mut RecognizerResult) {
    let answers = match answers {
        Some(answers) if !answers.is_empty() => answers,
        _ => {
            result.intents.insert(NONE_INTENT, 1.0);
            return;
        }
    };

    let mut top = &answers[0];
    for answer in answers {
        if confidence(answer) > confidence(top) {
            top = answer;
        }
    }

    result
        .intents
        .insert(QUESTION_ANSWERING_MATCH_INTENT, confidence(top));
    result.entities.insert(
        "answer".to_string(),
        Value::Array(vec![top.get("answer").cloned().unwrap_or(Value::Null)]),
    );
    result
        .properties
        .insert("answers".to_string(), Value::Array(answers.clone()));
}

fn confidence(answer: &Value) -> f64 {
    answer
        .get("confidenceScore")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
