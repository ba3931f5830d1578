// src/services/gemini_service.rs
use crate::config::Config;
use crate::errors::CreatorError;
use crate::models::{AnalysisRequest, GenerationRequest};
use crate::services::GenerativeBackend;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Instant;

pub struct GeminiService {
    api_key: String,
    model: String,
    api_base: String,
    client: Client,
}

impl GeminiService {
    pub fn new(config: &Config) -> Result<Self, CreatorError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CreatorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            api_base: config.gemini_api_base.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    async fn generate_content(&self, body: &Value, purpose: &str) -> Result<String, CreatorError> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                CreatorError::Transport(format!("Gemini {} request failed: {}", purpose, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CreatorError::Transport(format!(
                "Gemini {} error ({}): {}",
                purpose, status, error_text
            )));
        }

        let envelope: Value = response.json().await.map_err(|e| {
            CreatorError::Transport(format!("Failed to read Gemini {} response: {}", purpose, e))
        })?;

        debug!(
            "Gemini {} call on {} finished in {} ms",
            purpose,
            self.model,
            start.elapsed().as_millis()
        );

        extract_text(&envelope)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiService {
    async fn analyze_image(&self, request: &AnalysisRequest) -> Result<String, CreatorError> {
        let body = content_body(
            &request.system_instruction,
            &request.user_prompt,
            Some((request.image.mime_type.as_str(), request.image.data.as_str())),
            &request.response_schema,
        );
        self.generate_content(&body, "analysis").await
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, CreatorError> {
        let image = request
            .payload
            .reference_image
            .as_deref()
            .map(|data| (request.reference_mime_type.as_deref().unwrap_or("image/png"), data));

        let body = content_body(
            &request.system_instruction,
            &request.user_prompt,
            image,
            &request.response_schema,
        );
        self.generate_content(&body, "generation").await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn content_body(
    system_instruction: &str,
    user_prompt: &str,
    image: Option<(&str, &str)>,
    response_schema: &Value,
) -> Value {
    let mut parts = vec![json!({ "text": user_prompt })];
    if let Some((mime_type, data)) = image {
        parts.push(json!({
            "inlineData": {
                "mimeType": mime_type,
                "data": data
            }
        }));
    }

    json!({
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema
        }
    })
}

/// Concatenates the text parts of the first candidate. A candidate without
/// text yields an empty string, which the validators reject as unparsable.
fn extract_text(envelope: &Value) -> Result<String, CreatorError> {
    let Some(candidate) = envelope["candidates"].get(0) else {
        let reason = envelope["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(CreatorError::Transport(format!("Gemini returned no output: {}", reason)));
    };

    if let Some(finish) = candidate["finishReason"].as_str() {
        if finish != "STOP" {
            warn!("Gemini candidate finished with reason {}", finish);
        }
    }

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default();

    Ok(text)
}
