//! Read-only views over a raw `:analyze-conversations` response.
//!
//! The service answers with a JSON tree whose shape depends on the project
//! kind. These views pick out the handful of fields the normalizer needs and
//! turn the string tags into enums; everything else stays as borrowed JSON.

use crate::error::{CluError, Result};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of the project that produced a prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectKind {
    /// Conversational language understanding project.
    Conversation,
    /// Orchestration (formerly "workflow") project routing to other projects.
    Orchestration,
    Unknown(String),
}

impl ProjectKind {
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "conversation" => ProjectKind::Conversation,
            "orchestration" | "workflow" => ProjectKind::Orchestration,
            _ => ProjectKind::Unknown(tag.to_string()),
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Conversation => f.write_str("Conversation"),
            ProjectKind::Orchestration => f.write_str("Orchestration"),
            ProjectKind::Unknown(tag) => f.write_str(tag),
        }
    }
}

/// Kind of project an orchestration intent is connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Conversation,
    Luis,
    QuestionAnswering,
    /// Anything else, including `NonLinked` intents.
    Unknown(String),
}

impl TargetKind {
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "conversation" => TargetKind::Conversation,
            "luis" => TargetKind::Luis,
            "questionanswering" => TargetKind::QuestionAnswering,
            _ => TargetKind::Unknown(tag.to_string()),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Conversation => f.write_str("Conversation"),
            TargetKind::Luis => f.write_str("Luis"),
            TargetKind::QuestionAnswering => f.write_str("QuestionAnswering"),
            TargetKind::Unknown(tag) => f.write_str(tag),
        }
    }
}

/// The parts of a raw response every normalization path needs.
#[derive(Debug, Clone)]
pub struct AnalyzeResponse<'a> {
    /// Query echoed by the service.
    pub query: Option<&'a str>,
    pub detected_language: Option<&'a str>,
    /// `projectKind` exactly as the service sent it.
    pub project_kind_tag: &'a str,
    pub project_kind: ProjectKind,
    pub top_intent: Option<&'a str>,
    pub prediction: &'a Map<String, Value>,
}

impl<'a> AnalyzeResponse<'a> {
    /// Locate the prediction under `result.prediction` or `prediction`.
    ///
    /// A response without a prediction object or without a `projectKind` is
    /// malformed.
    pub fn parse(raw: &'a Value) -> Result<Self> {
        let root = raw.as_object().ok_or_else(|| {
            CluError::MalformedResponse("response is not a JSON object".to_string())
        })?;

        let container = match root.get("result").and_then(Value::as_object) {
            Some(result) if result.contains_key("prediction") => result,
            _ => root,
        };

        let prediction = container
            .get("prediction")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                CluError::MalformedResponse("response has no prediction object".to_string())
            })?;

        let project_kind_tag = prediction
            .get("projectKind")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CluError::MalformedResponse("prediction has no projectKind".to_string())
            })?;

        Ok(Self {
            query: container.get("query").and_then(Value::as_str),
            detected_language: container.get("detectedLanguage").and_then(Value::as_str),
            project_kind_tag,
            project_kind: ProjectKind::parse(project_kind_tag),
            top_intent: prediction.get("topIntent").and_then(Value::as_str),
            prediction,
        })
    }

    /// The target intent result selected by `topIntent` of an orchestration
    /// prediction.
    pub fn target(&self) -> Option<TargetIntentResult<'a>> {
        let name = self.top_intent?;
        let entry = self
            .prediction
            .get("intents")
            .and_then(Value::as_object)?
            .get(name)?
            .as_object()?;
        Some(TargetIntentResult::from_entry(name, entry))
    }
}

/// One entry of an orchestration prediction's `intents` map.
#[derive(Debug, Clone)]
pub struct TargetIntentResult<'a> {
    pub name: &'a str,
    /// `targetProjectKind` exactly as the service sent it.
    pub kind_tag: &'a str,
    pub kind: TargetKind,
    pub confidence_score: Option<f64>,
    /// The nested result of the connected project.
    pub result: Option<&'a Map<String, Value>>,
}

impl<'a> TargetIntentResult<'a> {
    fn from_entry(name: &'a str, entry: &'a Map<String, Value>) -> Self {
        let kind_tag = entry
            .get("targetProjectKind")
            .or_else(|| entry.get("targetKind"))
            .and_then(Value::as_str)
            .unwrap_or("");
        Self {
            name,
            kind_tag,
            kind: TargetKind::parse(kind_tag),
            confidence_score: entry.get("confidenceScore").and_then(Value::as_f64),
            result: entry.get("result").and_then(Value::as_object),
        }
    }

    /// `result.prediction` of a conversation or LUIS target.
    pub fn nested_prediction(&self) -> Option<&'a Map<String, Value>> {
        self.result?.get("prediction")?.as_object()
    }

    /// `result.answers` of a question answering target.
    pub fn answers(&self) -> Option<&'a Vec<Value>> {
        self.result?.get("answers")?.as_array()
    }
}
