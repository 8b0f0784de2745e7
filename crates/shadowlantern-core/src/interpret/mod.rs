//! Interpretation of collected responses by an external text generator.
//!
//! The generator is untrusted and may be absent. [`Interpreter`] never
//! returns an error: on any failure it logs a warning and hands back the
//! static fallback for the requested analysis, tagged with
//! [`AnalysisSource::Fallback`].

mod gemini;
mod json;
pub mod prompts;
mod results;

pub use gemini::{resolve_api_key, GeminiClient, API_KEY_ENTRY, API_KEY_ENV};
pub use json::{extract_as, extract_json};
pub use results::{
    CategoryValues, CciAnalysis, DetectedValue, ObstaclePlan, ScoredValue, SentenceAnalysis,
    ShadowAnalysis, ShadowInsight, Theme,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::diagnosis::{LogMessage, PhaseResponses};
use crate::error::InterpretError;
use crate::storage::InterpretConfig;

/// One call to the text generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Ask the service for a JSON-only response.
    pub json_mode: bool,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_mode: false,
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// A service that turns a prompt into text.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, InterpretError>;
}

/// `None` behaves like a service without credentials.
impl<G: TextGenerator> TextGenerator for Option<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, InterpretError> {
        match self {
            Some(inner) => inner.generate(request).await,
            None => Err(InterpretError::MissingApiKey),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    Model,
    Fallback { reason: String },
}

/// A result plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis<T> {
    pub result: T,
    pub source: AnalysisSource,
}

impl<T> Analysis<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, AnalysisSource::Fallback { .. })
    }
}

pub struct Interpreter<G> {
    generator: G,
    temperature: f64,
    max_output_tokens: u32,
}

impl<G: TextGenerator> Interpreter<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }

    pub fn with_config(generator: G, config: &InterpretConfig) -> Self {
        Self {
            generator,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    fn request(&self, prompt: String, json_mode: bool) -> GenerationRequest {
        GenerationRequest {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            ..GenerationRequest::new(prompt).with_json_mode(json_mode)
        }
    }

    async fn structured<T: DeserializeOwned>(
        &self,
        what: &str,
        prompt: String,
        json_mode: bool,
        fallback: impl FnOnce() -> T,
    ) -> Analysis<T> {
        let outcome = match self.generator.generate(&self.request(prompt, json_mode)).await {
            Ok(text) => extract_as::<T>(&text).ok_or(InterpretError::Unparsable { raw: text }),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(result) => {
                debug!(analysis = what, "model analysis parsed");
                Analysis {
                    result,
                    source: AnalysisSource::Model,
                }
            }
            Err(e) => {
                warn!(analysis = what, error = %e, "using fallback analysis");
                Analysis {
                    result: fallback(),
                    source: AnalysisSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Next interrogation question, or `None` when the service is
    /// unavailable so the caller can use a static follow-up.
    pub async fn next_question(&self, phase: &str, log: &[LogMessage]) -> Option<String> {
        let request = self.request(prompts::next_question(phase, log), false);
        match self.generator.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!(phase, "empty follow-up question");
                None
            }
            Err(e) => {
                warn!(phase, error = %e, "follow-up question unavailable");
                None
            }
        }
    }

    pub async fn analyze_shadow(&self, responses: &[PhaseResponses]) -> Analysis<ShadowAnalysis> {
        self.structured(
            "shadow",
            prompts::shadow_analysis(responses),
            false,
            ShadowAnalysis::fallback,
        )
        .await
    }

    pub async fn analyze_sentences(
        &self,
        responses: &[PhaseResponses],
    ) -> Analysis<SentenceAnalysis> {
        self.structured(
            "sentence",
            prompts::sentence_analysis(responses),
            true,
            SentenceAnalysis::fallback,
        )
        .await
    }

    pub async fn analyze_cci(&self, responses: &[PhaseResponses]) -> Analysis<CciAnalysis> {
        self.structured("cci", prompts::cci_analysis(responses), false, CciAnalysis::fallback)
            .await
    }

    /// If-then plan for an obstacle.
    ///
    /// Non-JSON text from the service is kept as the plan itself.
    pub async fn obstacle_plan(
        &self,
        goal: &str,
        obstacle: &str,
        value_context: Option<&str>,
    ) -> Analysis<ObstaclePlan> {
        let request = self.request(prompts::obstacle_plan(goal, obstacle, value_context), true);
        match self.generator.generate(&request).await {
            Ok(text) => {
                let result = extract_as::<ObstaclePlan>(&text).unwrap_or_else(|| ObstaclePlan {
                    if_then_plan: text.trim().to_string(),
                    suggestions: Vec::new(),
                });
                Analysis {
                    result,
                    source: AnalysisSource::Model,
                }
            }
            Err(e) => {
                warn!(error = %e, "using fallback obstacle plan");
                Analysis {
                    result: ObstaclePlan::fallback(obstacle),
                    source: AnalysisSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}
