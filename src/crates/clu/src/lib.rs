//! Conversational language understanding (CLU) recognizer.
//!
//! This crate calls the `:analyze-conversations` operation of a deployed CLU
//! project and reshapes the answer into a [`RecognizerResult`] that dialog
//! code can consume without caring which kind of project answered.
//!
//! # Project kinds
//!
//! - **Conversation** projects return intents and entities directly.
//! - **Orchestration** projects route the utterance to a connected project and
//!   return its result under the top intent:
//!   - a conversation project (mapped like a direct conversation result),
//!   - a LUIS application (mapped like the LUIS recognizer output),
//!   - a question answering knowledge base (mapped like the QnA recognizer
//!     output, with a `QuestionAnsweringMatch` or `None` intent).
//!
//! # Example
//!
//! ```rust,ignore
//! use clu::{CluApplication, CluOptions, CluRecognizer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = CluApplication::new(
//!         "FlightBooking",
//!         "production",
//!         std::env::var("CLU_API_KEY")?,
//!         "https://my-language.cognitiveservices.azure.com",
//!     )?;
//!     let recognizer = CluRecognizer::new(CluOptions::new(app))?;
//!
//!     let result = recognizer.recognize("fly from Seattle to Paris tomorrow").await?;
//!     println!("Top intent: {:?}", result.top_intent());
//!     for entity in result.conversation_entities() {
//!         println!("{} = {}", entity.category, entity.text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Offline normalization
//!
//! ```rust,ignore
//! use clu::normalize;
//!
//! let raw: serde_json::Value = serde_json::from_str(&saved_response)?;
//! let result = normalize(&raw, "what are your hours?")?;
//! ```

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod normalizer;
pub mod prediction;
pub mod request;
pub mod result;
pub mod trace;

// Re-export commonly used types
pub use client::CluRecognizer;
pub use config::{CluApplication, CluOptions};
pub use entity::{utf16_span_to_byte_range, CluEntity};
pub use error::{CluError, Result};
pub use normalizer::{normalize, QUESTION_ANSWERING_MATCH_INTENT};
pub use prediction::{ProjectKind, TargetKind};
pub use request::AnalyzeConversationRequest;
pub use result::{IntentMap, IntentScore, RecognizerConvert, RecognizerResult};
pub use trace::{LogTraceSink, TraceActivity, TraceSink, CLU_TRACE_LABEL};
