//! Inference client — the single point of entry for all Gemini API calls in JobCraft.
//!
//! ARCHITECTURAL RULE: no other module may call the generative service directly.
//! The client is constructed once at startup and shared through `AppState`;
//! handlers never re-instantiate it per request.
//!
//! One user-initiated submission maps to exactly one HTTP request: there is no
//! automatic retry. Every retry is a new explicit user action.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// MIME type accepted for résumé attachments across the whole pipeline.
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Request model
// ────────────────────────────────────────────────────────────────────────────

/// Declared shape of the model's response.
///
/// `GradingArray` is the one structured mode: it pins zero-temperature,
/// top-1 sampling and a strict JSON schema, because its output feeds a
/// numeric score and reproducibility matters more than variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    FreeText,
    GradingArray,
}

/// A base64-encoded PDF ready for JSON-embedded transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePdf {
    pub mime_type: String,
    pub data_base64: String,
}

/// One composed request to the generative capability.
/// Constructed fresh per submission; never cached or reused.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    pub attachment: Option<InlinePdf>,
    pub shape: ResponseShape,
}

/// Seam between the pipeline and the generative capability.
/// Carried in `AppState` as `Arc<dyn GenerativeModel>` so tests can drive the
/// pipeline with a mock instead of the live service.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Delivers one composed request and returns the raw response text.
    async fn generate(&self, request: &InferenceRequest) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types (camelCase on the wire)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    error: GeminiApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiApiErrorBody {
    message: String,
}

/// Strict response schema for the grading flow: exactly five
/// `{metric, grade, feedback}` records. Gemini schema types are uppercase.
pub fn grading_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "minItems": 5,
        "maxItems": 5,
        "items": {
            "type": "OBJECT",
            "properties": {
                "metric":   { "type": "STRING" },
                "grade":    { "type": "STRING" },
                "feedback": { "type": "STRING" }
            },
            "required": ["metric", "grade", "feedback"]
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single Gemini client used by every flow in JobCraft.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn sampling_for(shape: ResponseShape) -> Option<GenerationConfig> {
        match shape {
            ResponseShape::FreeText => None,
            ResponseShape::GradingArray => Some(GenerationConfig {
                temperature: Some(0.0),
                top_p: Some(1.0),
                top_k: Some(1),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(grading_response_schema()),
            }),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &InferenceRequest) -> Result<String, LlmError> {
        let mut parts = vec![Part {
            text: Some(request.prompt.as_str()),
            inline_data: None,
        }];
        // Prompt first, attachment second — the part order the service expects
        // for "analyze the attached document" instructions.
        if let Some(pdf) = &request.attachment {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: &pdf.mime_type,
                    data: &pdf.data_base64,
                }),
            });
        }

        let body = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: Self::sampling_for(request.shape),
        };

        // API key travels as a header, never in the URL, so request traces
        // stay credential-free.
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "inference call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grading_schema_requires_all_three_fields() {
        let schema = grading_response_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["metric", "grade", "feedback"]);
    }

    #[test]
    fn test_grading_schema_pins_exactly_five_records() {
        let schema = grading_response_schema();
        assert_eq!(schema["minItems"], 5);
        assert_eq!(schema["maxItems"], 5);
    }

    #[test]
    fn test_grading_shape_binds_deterministic_sampling() {
        let config = GeminiClient::sampling_for(ResponseShape::GradingArray).unwrap();
        assert_eq!(config.temperature, Some(0.0));
        assert_eq!(config.top_p, Some(1.0));
        assert_eq!(config.top_k, Some(1));
        assert_eq!(
            config.response_mime_type.as_deref(),
            Some("application/json")
        );
        assert!(config.response_schema.is_some());
    }

    #[test]
    fn test_free_text_shape_uses_service_defaults() {
        assert!(GeminiClient::sampling_for(ResponseShape::FreeText).is_none());
    }

    #[test]
    fn test_request_serializes_inline_data_camel_case() {
        let body = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        text: Some("Analyze the attached resume."),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: PDF_MIME,
                            data: "JVBERi0=",
                        }),
                    },
                ],
            }],
            generation_config: GeminiClient::sampling_for(ResponseShape::GradingArray),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            PDF_MIME
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["topK"], 1);
    }

    #[test]
    fn test_candidate_text_extraction_from_response_json() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "<p>Done</p>"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .unwrap();
        assert_eq!(text, "<p>Done</p>");
    }

    #[test]
    fn test_empty_candidates_deserialize_cleanly() {
        let parsed: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
