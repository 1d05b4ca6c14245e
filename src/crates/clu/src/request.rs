//! Request body for the `:analyze-conversations` operation.

use crate::config::CluOptions;
use serde::Serialize;

/// Offsets in responses are counted in UTF-16 code units.
pub const STRING_INDEX_TYPE: &str = "Utf16CodeUnit";

const CONVERSATION_ITEM_ID: &str = "1";
const PARTICIPANT_ID: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeConversationRequest {
    pub analysis_input: AnalysisInput,
    pub parameters: AnalysisParameters,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub conversation_item: ConversationItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationItem {
    pub text: String,
    pub id: String,
    pub participant_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParameters {
    pub project_name: String,
    pub deployment_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_logging_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_target: Option<String>,
    pub string_index_type: &'static str,
}

impl AnalyzeConversationRequest {
    /// Build the request for `utterance` from `options`.
    pub fn new(options: &CluOptions, utterance: impl Into<String>) -> Self {
        let app = &options.application;
        Self {
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    text: utterance.into(),
                    id: CONVERSATION_ITEM_ID.to_string(),
                    participant_id: PARTICIPANT_ID.to_string(),
                },
            },
            parameters: AnalysisParameters {
                project_name: app.project_name().to_string(),
                deployment_name: app.deployment_name().to_string(),
                language: options.language.clone(),
                verbose: options.verbose,
                is_logging_enabled: options.is_logging_enabled,
                direct_target: options.direct_target.clone(),
                string_index_type: STRING_INDEX_TYPE,
            },
            kind: "Conversation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CluApplication;
    use serde_json::json;

    fn options() -> CluOptions {
        CluOptions::new(
            CluApplication::new(
                "FlightBooking",
                "production",
                "0123456789abcdef0123456789abcdef",
                "https://example.cognitiveservices.azure.com",
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_minimal_request_body() {
        let request = AnalyzeConversationRequest::new(&options(), "book a flight");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "analysisInput": {
                    "conversationItem": {"text": "book a flight", "id": "1", "participantId": "1"}
                },
                "parameters": {
                    "projectName": "FlightBooking",
                    "deploymentName": "production",
                    "stringIndexType": "Utf16CodeUnit"
                },
                "kind": "Conversation"
            })
        );
    }

    #[test]
    fn test_optional_parameters() {
        let options = options()
            .with_language("fr")
            .with_verbose(true)
            .with_logging_enabled(false)
            .with_direct_target("Faq");
        let body = serde_json::to_value(AnalyzeConversationRequest::new(&options, "bonjour")).unwrap();

        let parameters = &body["parameters"];
        assert_eq!(parameters["language"], json!("fr"));
        assert_eq!(parameters["verbose"], json!(true));
        assert_eq!(parameters["isLoggingEnabled"], json!(false));
        assert_eq!(parameters["directTarget"], json!("Faq"));
    }
}
