//! Trace side channel.
//!
//! After every recognition the recognizer hands a [`TraceActivity`] carrying
//! the raw response and the normalized result to a [`TraceSink`]. Hosts that
//! have their own transcript or telemetry plug in a sink; the default one
//! writes the activity to the `tracing` log. Sink failures are logged and never
//! change the recognition result.

use crate::error::Result;
use crate::result::RecognizerResult;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// Name of the trace activity.
pub const CLU_TRACE_NAME: &str = "CLU Recognizer";
/// Label of the trace activity.
pub const CLU_TRACE_LABEL: &str = "CLU Trace";
/// Value type of the trace activity.
pub const CLU_TRACE_VALUE_TYPE: &str = "CluRecognizer";

/// A trace event emitted after a recognition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceActivity {
    pub name: String,
    pub label: String,
    pub value_type: String,
    /// `{"response": <raw>, "recognizerResult": <normalized>}`
    pub value: Value,
}

impl TraceActivity {
    pub fn recognition(response: &Value, result: &RecognizerResult) -> Result<Self> {
        Ok(Self {
            name: CLU_TRACE_NAME.to_string(),
            label: CLU_TRACE_LABEL.to_string(),
            value_type: CLU_TRACE_VALUE_TYPE.to_string(),
            value: json!({
                "response": response,
                "recognizerResult": serde_json::to_value(result)?,
            }),
        })
    }
}

/// Receiver of trace activities.
#[async_trait]
pub trait TraceSink: Send + Sync {
    async fn trace(&self, activity: &TraceActivity) -> Result<()>;
}

/// Writes trace activities to the `tracing` log at debug level.
#[derive(Debug, Clone, Default)]
pub struct LogTraceSink;

#[async_trait]
impl TraceSink for LogTraceSink {
    async fn trace(&self, activity: &TraceActivity) -> Result<()> {
        debug!(
            name = %activity.name,
            label = %activity.label,
            value_type = %activity.value_type,
            value = %activity.value,
            "trace activity"
        );
        Ok(())
    }
}
