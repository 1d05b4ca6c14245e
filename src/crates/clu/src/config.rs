//! Configuration for the CLU recognizer.
//!
//! A [`CluApplication`] carries the connection details of a deployed CLU
//! project and is validated when it is built, so that a bad key or endpoint
//! fails at startup rather than on the first utterance. [`CluOptions`] wraps
//! the application with the optional analysis parameters and transport
//! settings.
//!
//! # Example
//!
//! ```rust,ignore
//! use clu::config::{CluApplication, CluOptions};
//!
//! let app = CluApplication::from_env()?;
//! let options = CluOptions::new(app)
//!     .with_language("en")
//!     .with_verbose(true);
//!
//! // or from a file
//! let options = CluOptions::from_file("clu.yaml")?;
//! ```

use crate::error::{CluError, Result};
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable holding the project name.
pub const ENV_PROJECT_NAME: &str = "CLU_PROJECT_NAME";
/// Environment variable holding the deployment name.
pub const ENV_DEPLOYMENT_NAME: &str = "CLU_DEPLOYMENT_NAME";
/// Environment variable holding the endpoint (subscription) key.
pub const ENV_API_KEY: &str = "CLU_API_KEY";
/// Environment variable holding the endpoint URL.
pub const ENV_API_HOST_NAME: &str = "CLU_API_HOST_NAME";

/// Default REST API version for `:analyze-conversations`.
pub const DEFAULT_API_VERSION: &str = "2023-04-01";

/// Connection details for a deployed CLU project.
///
/// Construct with [`CluApplication::new`]; every constructor path, including
/// deserialization, runs the same validation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawApplication")]
pub struct CluApplication {
    project_name: String,
    deployment_name: String,
    #[serde(skip_serializing)]
    endpoint_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct RawApplication {
    #[serde(alias = "projectName", alias = "CluProjectName")]
    project_name: String,
    #[serde(alias = "deploymentName", alias = "CluDeploymentName")]
    deployment_name: String,
    #[serde(alias = "endpointKey", alias = "CluAPIKey")]
    endpoint_key: String,
    #[serde(alias = "CluAPIHostName")]
    endpoint: String,
}

impl TryFrom<RawApplication> for CluApplication {
    type Error = CluError;

    fn try_from(raw: RawApplication) -> Result<Self> {
        CluApplication::new(
            raw.project_name,
            raw.deployment_name,
            raw.endpoint_key,
            raw.endpoint,
        )
    }
}

impl CluApplication {
    /// Create and validate a CLU application description.
    ///
    /// Surrounding whitespace is stripped from every value before it is
    /// validated and stored.
    pub fn new(
        project_name: impl Into<String>,
        deployment_name: impl Into<String>,
        endpoint_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let app = Self {
            project_name: project_name.into().trim().to_string(),
            deployment_name: deployment_name.into().trim().to_string(),
            endpoint_key: endpoint_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
        };
        app.validate()?;
        Ok(app)
    }

    /// Load the application from `CLU_PROJECT_NAME`, `CLU_DEPLOYMENT_NAME`,
    /// `CLU_API_KEY` and `CLU_API_HOST_NAME`.
    pub fn from_env() -> Result<Self> {
        Self::new(
            get_env(ENV_PROJECT_NAME)?,
            get_env(ENV_DEPLOYMENT_NAME)?,
            get_env(ENV_API_KEY)?,
            get_env(ENV_API_HOST_NAME)?,
        )
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    pub fn endpoint_key(&self) -> &str {
        &self.endpoint_key
    }

    /// Endpoint URL with any trailing `/` removed.
    pub fn endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    fn validate(&self) -> Result<()> {
        require_non_blank("project_name", &self.project_name)?;
        require_non_blank("deployment_name", &self.deployment_name)?;
        require_non_blank("endpoint_key", &self.endpoint_key)?;
        require_non_blank("endpoint", &self.endpoint)?;

        if !is_valid_endpoint_key(&self.endpoint_key) {
            return Err(CluError::ConfigError(
                "endpoint_key is not a valid CLU subscription key".to_string(),
            ));
        }

        if !is_valid_endpoint(&self.endpoint) {
            return Err(CluError::ConfigError(format!(
                "\"{}\" is not a valid CLU endpoint",
                self.endpoint
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for CluApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CluApplication")
            .field("project_name", &self.project_name)
            .field("deployment_name", &self.deployment_name)
            .field("endpoint_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CluError::ConfigError(format!(
            "{} value is empty or whitespace. Please use a valid {}.",
            field, field
        )));
    }
    Ok(())
}

/// Accepts a GUID-shaped key (any version or variant) or a 32 hex digit token.
pub fn is_valid_endpoint_key(key: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|[0-9a-f]{32})$",
        )
        .expect("endpoint key pattern is valid")
    });
    pattern.is_match(key)
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn is_valid_endpoint(endpoint: &str) -> bool {
    if endpoint.trim() != endpoint {
        return false;
    }
    match Url::parse(endpoint) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Options for calling a CLU application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CluOptions {
    /// Connection details.
    pub application: CluApplication,

    /// Language of the utterances, e.g. `"en"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Ask the service for a more verbose response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Let the service keep the query for model review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_logging_enabled: Option<bool>,

    /// Name of the target project an orchestration request is sent to directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_target: Option<String>,

    /// REST API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in milliseconds. Zero disables the timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum retries for retryable failures. Zero disables retries.
    #[serde(default)]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds; doubled on each retry.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl CluOptions {
    /// Create options with defaults for everything but the application.
    pub fn new(application: CluApplication) -> Self {
        Self {
            application,
            language: None,
            verbose: None,
            is_logging_enabled: None,
            direct_target: None,
            api_version: default_api_version(),
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// Load options from a YAML (`.yaml`/`.yml`) or JSON (`.json`) file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load_config_file(path)
    }

    /// Set the utterance language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Request a verbose response.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Enable or disable service-side logging of the query.
    pub fn with_logging_enabled(mut self, enabled: bool) -> Self {
        self.is_logging_enabled = Some(enabled);
        self
    }

    /// Route an orchestration request straight to one target project.
    pub fn with_direct_target(mut self, target: impl Into<String>) -> Self {
        self.direct_target = Some(target.into());
        self
    }

    /// Set the REST API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the request timeout. `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Full URL of the `:analyze-conversations` operation.
    pub fn analyze_url(&self) -> String {
        format!(
            "{}/language/:analyze-conversations?api-version={}",
            self.application.endpoint(),
            self.api_version
        )
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn get_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|e| {
        CluError::ConfigError(format!("Environment variable '{}' not found: {}", key, e))
    })
}

fn load_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            CluError::ConfigError(format!("Unable to determine file extension for {:?}", path))
        })?;

    let content = std::fs::read_to_string(path)?;
    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| {
            CluError::ConfigError(format!("Failed to parse YAML config from {:?}: {}", path, e))
        }),
        "json" => serde_json::from_str(&content).map_err(|e| {
            CluError::ConfigError(format!("Failed to parse JSON config from {:?}: {}", path, e))
        }),
        _ => Err(CluError::ConfigError(format!(
            "Unsupported config file extension: {}",
            extension
        ))),
    }
}
