//! CLU recognizer client.
//!
//! Sends an utterance to the `:analyze-conversations` endpoint of a deployed
//! CLU project, normalizes the answer and reports a trace activity.
//!
//! # Example
//!
//! ```rust,ignore
//! use clu::{CluApplication, CluOptions, CluRecognizer};
//!
//! let options = CluOptions::new(CluApplication::from_env()?).with_language("en");
//! let recognizer = CluRecognizer::new(options)?;
//!
//! let result = recognizer.recognize("book a flight from Seattle to Paris").await?;
//! if let Some((intent, score)) = result.top_intent() {
//!     println!("{} ({:.2})", intent, score);
//! }
//! ```

use crate::config::CluOptions;
use crate::error::{CluError, Result};
use crate::normalizer::normalize;
use crate::request::AnalyzeConversationRequest;
use crate::result::{RecognizerConvert, RecognizerResult};
use crate::trace::{LogTraceSink, TraceActivity, TraceSink};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the endpoint key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Recognizer backed by a CLU deployment.
#[derive(Clone)]
pub struct CluRecognizer {
    options: CluOptions,
    client: Client,
    trace_sink: Arc<dyn TraceSink>,
}

impl CluRecognizer {
    /// Create a recognizer with the given options.
    pub fn new(options: CluOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CluError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(options, client))
    }

    /// Create a recognizer around an existing HTTP client.
    pub fn with_client(options: CluOptions, client: Client) -> Self {
        Self {
            options,
            client,
            trace_sink: Arc::new(LogTraceSink),
        }
    }

    /// Replace the trace sink.
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = sink;
        self
    }

    pub fn options(&self) -> &CluOptions {
        &self.options
    }

    /// Recognize intents and entities in `utterance`.
    pub async fn recognize(&self, utterance: &str) -> Result<RecognizerResult> {
        let response = self.analyze(utterance).await?;
        let result = normalize(&response, utterance)?;

        match TraceActivity::recognition(&response, &result) {
            Ok(activity) => {
                if let Err(e) = self.trace_sink.trace(&activity).await {
                    warn!("Failed to emit CLU trace: {}", e);
                }
            }
            Err(e) => warn!("Failed to build CLU trace: {}", e),
        }

        Ok(result)
    }

    /// Recognize `utterance` and convert the result into `T`.
    pub async fn recognize_as<T: RecognizerConvert>(&self, utterance: &str) -> Result<T> {
        let result = self.recognize(utterance).await?;
        Ok(T::convert(&result))
    }

    /// Send `utterance` and return the raw service response.
    pub async fn analyze(&self, utterance: &str) -> Result<Value> {
        let request = AnalyzeConversationRequest::new(&self.options, utterance);

        let mut attempt = 0;
        let mut delay = self.options.retry_delay();
        loop {
            match self.send(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.options.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.options.max_retries,
                        "CLU request failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2).min(Duration::from_secs(30));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, request: &AnalyzeConversationRequest) -> Result<Value> {
        let url = self.options.analyze_url();
        debug!(
            url = %url,
            project = request.parameters.project_name.as_str(),
            deployment = request.parameters.deployment_name.as_str(),
            "Sending CLU analyze request"
        );

        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, self.options.application.endpoint_key())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CluError::Timeout(e.to_string())
                } else {
                    CluError::HttpError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CluError::MalformedResponse(format!("response is not JSON: {}", e)))
    }
}

fn status_error(status: StatusCode, error_text: String) -> CluError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CluError::AuthenticationError(error_text)
        }
        StatusCode::TOO_MANY_REQUESTS => CluError::RateLimitExceeded(error_text),
        StatusCode::SERVICE_UNAVAILABLE => CluError::ServiceUnavailable(error_text),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CluError::Timeout(error_text),
        _ => CluError::ProviderError(format!("CLU API error {}: {}", status, error_text)),
    }
}
