use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::chat::{ChatEntry, ChatRole};
use crate::persona::SYSTEM_INSTRUCTION;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const THINKING_BUDGET: u32 = 16_000;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One turn of a `generateContent` exchange.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on thought-summary parts of thinking models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Default::default()
        }
    }
}

/// Base64 payload with its mime type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated answer text, thought summaries skipped.
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    fn first_inline_data(&self) -> Option<InlineData> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.clone())
    }
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            // Thinking turns can run for minutes.
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Send one chat turn with the prior conversation as context.
    pub async fn send_message(
        &self,
        message: &str,
        history: &[ChatEntry],
    ) -> Result<String, GeminiError> {
        tracing::info!(
            model = %self.model,
            history = history.len(),
            "Sending chat turn"
        );
        let body = chat_request_body(message, history);
        let response = self.generate(&self.model, &body).await?;
        Ok(response.text())
    }

    /// Ask the image model for a picture; `None` when no image part came back.
    pub async fn generate_image(&self, parts: Vec<Part>) -> Result<Option<InlineData>, GeminiError> {
        tracing::info!(model = %self.image_model, parts = parts.len(), "Requesting image");
        let contents = vec![Content { role: None, parts }];
        let body = json!({ "contents": contents });
        let response = self.generate(&self.image_model, &body).await?;
        Ok(response.first_inline_data())
    }

    async fn generate(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<GenerateResponse, GeminiError> {
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn chat_request_body(message: &str, history: &[ChatEntry]) -> serde_json::Value {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|entry| Content {
            role: Some(entry.role),
            parts: vec![Part::text(entry.text.clone())],
        })
        .collect();
    contents.push(Content {
        role: Some(ChatRole::User),
        parts: vec![Part::text(message)],
    });

    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": contents,
        "generationConfig": {
            "thinkingConfig": { "thinkingBudget": THINKING_BUDGET },
        },
    })
}

/// Pull `error.message` out of an API error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "unknown error".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
