//! LLM-based PII detection over an OpenAI-compatible chat API.
//!
//! Context-aware detection that catches unstructured PII (names,
//! addresses, medical info) that pattern matching misses. The model is
//! prompted to emit a JSON array of candidates; parsing is lenient
//! because models wrap JSON in prose or code fences.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{DetectError, DetectResult};
use crate::traits::Detector;
use crate::types::CandidateEntity;

/// System prompt for PII detection.
const NER_PROMPT: &str = r#"You are an advanced Named Entity Recognition system specializing in detecting Personally Identifiable Information (PII).

Analyze the given text and extract ALL entities from these categories:
- PERSON: Full names, first names, last names, nicknames
- EMAIL: Email addresses
- PHONE: Phone numbers in any format
- SSN: Social Security Numbers
- CREDITCARD: Credit card numbers
- ADDRESS: Street addresses, postal addresses
- LOCATION: Cities, states, countries, landmarks
- ORGANIZATION: Companies, institutions, government agencies
- DATE: Dates in any format
- TIME: Time expressions
- ID_NUMBER: Any identification numbers (IC, passport, license, etc.)
- FINANCIAL: Account numbers, routing numbers, financial institutions
- MEDICAL: Medical record numbers, patient IDs
- USERNAME: Usernames, handles, user IDs
- IP_ADDRESS: IP addresses
- URL: Website URLs
- MISC: Any other potentially sensitive information

For each entity found, return a JSON object with:
- "text": the exact text of the entity
- "label": the category (PERSON, EMAIL, etc.)
- "start": character start position in the text
- "end": character end position in the text
- "confidence": confidence score (0.0 to 1.0)

Return ONLY a valid JSON array of entities. If no entities found, return an empty array []."#;

/// PII detector backed by an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct LlmDetector {
    http_client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl LlmDetector {
    /// Create a detector with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> DetectResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| DetectError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    /// Set a custom base URL (for proxies or compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait::async_trait]
impl Detector for LlmDetector {
    async fn detect(&self, text: &str) -> DetectResult<Vec<CandidateEntity>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.model,
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": NER_PROMPT },
                { "role": "user", "content": format!("Text to analyze: \"{}\"", text) },
            ],
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| DetectError::MalformedResponse("no choices in response".into()))?;

        let records = extract_entity_json(content)?;
        Ok(parse_candidates(records))
    }
}

/// Pull the entity array out of model output: fenced ```json block
/// first, then a bare array, then the whole body.
fn extract_entity_json(content: &str) -> DetectResult<Vec<Value>> {
    let json_str = if let Some(fenced) = fenced_block(content) {
        fenced
    } else if let (Some(open), Some(close)) = (content.find('['), content.rfind(']')) {
        &content[open..=close]
    } else {
        content
    };

    let value: Value = serde_json::from_str(json_str.trim())
        .map_err(|e| DetectError::MalformedResponse(e.to_string()))?;

    match value {
        Value::Array(records) => Ok(records),
        Value::Object(_) => Ok(vec![value]),
        other => Err(DetectError::MalformedResponse(format!(
            "expected array of entities, got {}",
            other
        ))),
    }
}

fn fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```json")? + "```json".len();
    let rest = &content[start..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

/// Per-record tolerance: a malformed record is skipped, not fatal.
fn parse_candidates(records: Vec<Value>) -> Vec<CandidateEntity> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<CandidateEntity>(record) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!(error = %e, "skipping malformed detector record");
                None
            }
        })
        .inspect(|candidate| {
            debug!(text = %candidate.text, label = %candidate.label, "detector candidate");
        })
        .collect()
}
