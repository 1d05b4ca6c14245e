//! Normalization tests over recorded service responses.
//!
//! Covers every project kind the recognizer understands:
//! - Conversation projects
//! - Orchestration projects routed to conversation, LUIS and question
//!   answering targets
//! - Malformed responses

use clu::{normalize, CluError, RecognizerResult, QUESTION_ANSWERING_MATCH_INTENT};
use serde_json::{json, Value};

fn fixture(name: &str) -> Value {
    let text = match name {
        "conversation" => include_str!("fixtures/conversation.json"),
        "orchestration_conversation" => include_str!("fixtures/orchestration_conversation.json"),
        "orchestration_luis" => include_str!("fixtures/orchestration_luis.json"),
        "orchestration_qna" => include_str!("fixtures/orchestration_qna.json"),
        "orchestration_qna_empty" => include_str!("fixtures/orchestration_qna_empty.json"),
        other => panic!("unknown fixture {}", other),
    };
    serde_json::from_str(text).expect("fixture is valid JSON")
}

fn intent_names(result: &RecognizerResult) -> Vec<&str> {
    result.intents.names().collect()
}

// ============================================================
// Conversation projects
// ============================================================

#[test]
fn test_conversation_project() {
    let raw = fixture("conversation");
    let utterance = "book a flight from Seattle to Paris tomorrow";
    let result = normalize(&raw, utterance).unwrap();

    assert_eq!(result.text, utterance);
    assert_eq!(
        result.altered_text.as_deref(),
        Some("Book a flight from Seattle to Paris tomorrow")
    );

    assert_eq!(
        intent_names(&result),
        vec!["BookFlight", "GetWeather", "Cancel", "None"]
    );
    assert_eq!(result.intents.get("BookFlight").unwrap().score, 0.9466542);
    assert_eq!(result.intents.get("None").unwrap().score, 0.0);
    assert_eq!(result.top_intent(), Some(("BookFlight", 0.9466542)));

    assert_eq!(
        result.entities.get("entities"),
        Some(&raw["result"]["prediction"]["entities"])
    );

    assert_eq!(result.property("projectKind"), Some(&json!("Conversation")));
    assert_eq!(result.property("topIntent"), Some(&json!("BookFlight")));
    assert_eq!(result.property("detectedLanguage"), Some(&json!("en")));
}

#[test]
fn test_conversation_entities_typed_view() {
    let raw = fixture("conversation");
    let utterance = "Book a flight from Seattle to Paris tomorrow";
    let result = normalize(&raw, utterance).unwrap();

    let entities = result.conversation_entities();
    assert_eq!(entities.len(), 3);

    let from = result.entity("fromCity").unwrap();
    assert_eq!(from.span_in(utterance), Some("Seattle"));

    let date = result.entity("flightDate").unwrap();
    assert_eq!(date.timex(), Some("2023-03-02"));
    assert_eq!(date.span_in(utterance), Some("tomorrow"));
}

// ============================================================
// Orchestration projects
// ============================================================

#[test]
fn test_orchestration_conversation_target() {
    let raw = fixture("orchestration_conversation");
    let result = normalize(&raw, "book me a flight to Paris").unwrap();

    assert_eq!(intent_names(&result), vec!["BookFlight", "Cancel"]);
    assert_eq!(result.intents.get("BookFlight").unwrap().score, 0.95);
    assert_eq!(result.entity("toCity").unwrap().text, "Paris");

    assert_eq!(result.property("projectKind"), Some(&json!("Orchestration")));
    assert_eq!(result.property("topIntent"), Some(&json!("FlightBooking")));
    assert_eq!(result.property("targetIntentKind"), Some(&json!("Conversation")));
    assert!(result.property("detectedLanguage").is_none());
}

#[test]
fn test_orchestration_luis_target() {
    let raw = fixture("orchestration_luis");
    let result = normalize(&raw, "travel to Seattle on Saturday with 2 bags of 20 kg").unwrap();

    assert_eq!(intent_names(&result), vec!["Book_Flight", "Get_Weather", "None"]);
    assert_eq!(result.intents.get("Book_Flight").unwrap().score, 0.9789);
    assert_eq!(result.intents.get("None").unwrap().score, 0.0);

    let expected_entities = json!({
        "toCity": [{"location": "Seattle", "type": "city"}],
        "datetime": [{"timex": ["XXXX-WXX-6"], "type": "date"}],
        "weight": [{"number": 20, "units": "Kilogram"}],
        "$instance": {
            "toCity": [{
                "type": "builtin.geographyV2.city",
                "text": "Seattle",
                "startIndex": 10,
                "endIndex": 17,
                "modelType": "Prebuilt Entity Extractor",
                "recognitionSources": ["model"]
            }],
            "datetime": [{
                "type": "builtin.datetimeV2.date",
                "text": "Saturday",
                "startIndex": 21,
                "endIndex": 29,
                "modelType": "Prebuilt Entity Extractor",
                "recognitionSources": ["model"]
            }],
            "weight": [{
                "type": "builtin.weight",
                "text": "20 kg",
                "startIndex": 45,
                "endIndex": 50,
                "modelType": "Prebuilt Entity Extractor",
                "recognitionSources": ["model"]
            }]
        }
    });
    assert_eq!(Value::Object(result.entities.clone()), expected_entities);

    assert_eq!(
        result.property("sentiment"),
        Some(&json!({"label": "neutral", "score": 0.5}))
    );
    let luis_prediction =
        &raw["result"]["prediction"]["intents"]["HomeAutomation"]["result"]["prediction"];
    assert_eq!(result.property("luisResult"), Some(luis_prediction));
    assert_eq!(result.property("targetIntentKind"), Some(&json!("Luis")));
    assert_eq!(result.property("detectedLanguage"), Some(&json!("en")));
}

#[test]
fn test_luis_intent_keys_have_no_dots_or_spaces() {
    let raw = fixture("orchestration_luis");
    let result = normalize(&raw, "x").unwrap();

    for name in result.intents.names() {
        assert!(!name.contains('.'), "{} contains '.'", name);
        assert!(!name.contains(' '), "{} contains ' '", name);
    }
}

#[test]
fn test_luis_instance_metadata_has_no_length_model_type_id_or_role() {
    let raw = fixture("orchestration_luis");
    let result = normalize(&raw, "x").unwrap();

    let instance = result.entities["$instance"].as_object().unwrap();
    for items in instance.values() {
        for item in items.as_array().unwrap() {
            let item = item.as_object().unwrap();
            assert!(!item.contains_key("length"));
            assert!(!item.contains_key("modelTypeId"));
            assert!(!item.contains_key("role"));
            assert!(item.contains_key("endIndex"));
        }
    }
}

#[test]
fn test_orchestration_question_answering_target() {
    let raw = fixture("orchestration_qna");
    let result = normalize(&raw, "what are your opening hours?").unwrap();

    assert_eq!(intent_names(&result), vec![QUESTION_ANSWERING_MATCH_INTENT]);
    assert_eq!(
        result.intents.get(QUESTION_ANSWERING_MATCH_INTENT).unwrap().score,
        0.9
    );
    assert_eq!(
        result.entities.get("answer"),
        Some(&json!(["We are open 9am to 5pm, Monday to Friday."]))
    );
    assert_eq!(
        result.property("answers"),
        Some(&raw["result"]["prediction"]["intents"]["ChitChat-QnA"]["result"]["answers"])
    );
    assert_eq!(
        result.property("targetIntentKind"),
        Some(&json!("QuestionAnswering"))
    );
}

#[test]
fn test_orchestration_question_answering_without_answers() {
    let raw = fixture("orchestration_qna_empty");
    let result = normalize(&raw, "asdfgh").unwrap();

    assert_eq!(intent_names(&result), vec!["None"]);
    assert_eq!(result.intents.get("None").unwrap().score, 1.0);
    assert!(result.entities.is_empty());
    assert!(result.property("answers").is_none());
    assert_eq!(result.top_intent_or("None", 0.5), "None");
}

// ============================================================
// Malformed responses and determinism
// ============================================================

#[test]
fn test_missing_prediction_is_an_error() {
    let raw = json!({"kind": "ConversationResult", "result": {"query": "hello"}});
    let err = normalize(&raw, "hello").unwrap_err();
    assert!(matches!(err, CluError::MalformedResponse(_)));
}

#[test]
fn test_missing_project_kind_is_an_error() {
    let raw = json!({"result": {"prediction": {"topIntent": "x", "intents": [], "entities": []}}});
    assert!(matches!(
        normalize(&raw, "hello"),
        Err(CluError::MalformedResponse(_))
    ));
}

#[test]
fn test_normalization_is_deterministic() {
    for name in [
        "conversation",
        "orchestration_conversation",
        "orchestration_luis",
        "orchestration_qna",
        "orchestration_qna_empty",
    ] {
        let raw = fixture(name);
        let first = normalize(&raw, "utterance").unwrap();
        let second = normalize(&raw, "utterance").unwrap();
        assert_eq!(first, second, "fixture {}", name);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_concurrent_normalization() {
    let raw = fixture("orchestration_luis");
    let expected = normalize(&raw, "x").unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| normalize(&raw, "x").unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
