//! Gemini `generateContent` client.

use serde::{Deserialize, Serialize};

use guard_config::ClassifierConfig;

use crate::error::ModelError;
use crate::http::check_response;
use crate::model::{ModelClient, ModelRequest};

/// Calls `{base_url}/models/{model}:generateContent` with an API key header.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    /// Build a client from `[classifier]` settings.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotConfigured`] when no API key is set, or
    /// [`ModelError::Http`] when the HTTP client cannot be built.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ModelError> {
        if !config.is_configured() {
            return Err(ModelError::NotConfigured(
                "set GOOGLE_API_KEY or GUARDIAN_CLASSIFIER__API_KEY".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ReplyContent>,
}

#[derive(Debug, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

fn build_body(request: &ModelRequest, temperature: f32) -> GenerateBody<'_> {
    GenerateBody {
        system_instruction: request.system.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature,
            response_mime_type: request.json.then_some("application/json"),
        },
    }
}

/// Join the text parts of the first candidate.
fn extract_text(raw: &str) -> Result<String, ModelError> {
    let unusable = || ModelError::Unusable {
        raw: raw.chars().take(500).collect(),
    };
    let reply: GenerateReply = serde_json::from_str(raw).map_err(|_| unusable())?;
    let text: String = reply
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(unusable());
    }
    Ok(text)
}

impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let body = build_body(request, self.temperature);
        tracing::debug!(model = %self.model, json = request.json, "gemini: generateContent");
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let raw = resp.text().await?;
        extract_text(&raw)
    }
}
