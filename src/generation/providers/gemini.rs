//! Gemini (Google) image generation provider.

use crate::error::{parse_retry_after, sanitize_error_message, DeemgError, Result};
use crate::generation::provider::{CompositeRequest, ImageProvider};
use crate::image::{GeneratedImage, GenerationMetadata, UploadedImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }
}

impl FromStr for GeminiModel {
    type Err = DeemgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flash" | "nano-banana" | "gemini-2.5-flash-image" => Ok(Self::NanoBanana),
            "pro" | "nano-banana-pro" | "nano-banana-pro-preview" => Ok(Self::NanoBananaPro),
            other => Err(DeemgError::InvalidRequest(format!(
                "unknown Gemini model: {other}"
            ))),
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Required; the environment is not consulted here.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the provider.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DeemgError::Auth("no API key provided".into()))?;

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
        })
    }
}

/// Gemini image generation provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// The configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn generate_impl(&self, request: &CompositeRequest) -> Result<GeneratedImage> {
        let start = Instant::now();
        let url = format!("{API_BASE}/{}:generateContent", self.model.as_str());
        let body = GeminiRequest::from_composite_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        gemini_response.into_image(GenerationMetadata {
            model: Some(self.model.as_str().to_string()),
            duration_ms: Some(duration_ms),
        })
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> DeemgError {
    let text = sanitize_error_message(text);
    if status == 404 {
        return DeemgError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return DeemgError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return DeemgError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return DeemgError::ContentBlocked(text);
    }
    DeemgError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &CompositeRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{API_BASE}/{}", self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(DeemgError::Auth("Invalid API key".into())),
            404 => Err(DeemgError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(DeemgError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

impl From<&UploadedImage> for GeminiRequestPart {
    fn from(image: &UploadedImage) -> Self {
        Self::InlineData {
            inline_data: GeminiInlineData {
                mime_type: image.mime_type().to_string(),
                data: image.data().to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_composite_request(req: &CompositeRequest) -> Self {
        let parts = vec![
            GeminiRequestPart::from(&req.first),
            GeminiRequestPart::from(&req.second),
            GeminiRequestPart::Text {
                text: req.prompt.clone(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GeminiResponse {
    /// Pulls the first inline image out of the first candidate.
    fn into_image(self, metadata: GenerationMetadata) -> Result<GeneratedImage> {
        // Prompt blocks come back as HTTP 200
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
                return Err(DeemgError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            DeemgError::UnexpectedResponse("No candidates in Gemini response".into())
        })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    return Err(DeemgError::ContentBlocked(format!(
                        "Content blocked by Gemini safety filter: {finish_reason}"
                    )));
                }
                _ => {} // STOP, MAX_TOKENS, etc. fall through to the part scan
            }
        }

        let inline_data = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                DeemgError::UnexpectedResponse("No image data in Gemini response".into())
            })?;

        GeneratedImage::from_base64(&inline_data.data, &inline_data.mime_type, metadata)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::mode::GenerationMode;
    use crate::image::ImageFormat;
    use reqwest::header::HeaderMap;

    fn request() -> CompositeRequest {
        CompositeRequest::new(
            UploadedImage::new("Zmlyc3Q=", "image/png"),
            UploadedImage::new("c2Vjb25k", "image/jpeg"),
            &GenerationMode::Location("Paris, France".into()),
        )
    }

    fn parse(json: &str) -> Result<GeneratedImage> {
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        resp.into_image(GenerationMetadata::default())
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "nano-banana-pro-preview"
        );
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
    }

    #[test]
    fn test_gemini_model_from_str() {
        assert_eq!("pro".parse::<GeminiModel>().unwrap(), GeminiModel::NanoBananaPro);
        assert_eq!(
            " Gemini-2.5-Flash-Image ".parse::<GeminiModel>().unwrap(),
            GeminiModel::NanoBanana
        );
        assert!("dall-e".parse::<GeminiModel>().is_err());
    }

    #[test]
    fn test_builder_requires_key() {
        assert!(matches!(
            GeminiProviderBuilder::new().build(),
            Err(DeemgError::Auth(_))
        ));
        assert!(GeminiProvider::builder().api_key("  ").build().is_err());

        let provider = GeminiProvider::builder()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .build()
            .unwrap();
        assert_eq!(provider.model(), GeminiModel::NanoBananaPro);
    }

    #[test]
    fn test_request_part_order() {
        let gemini_req = GeminiRequest::from_composite_request(&request());
        let json = serde_json::to_value(&gemini_req).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["data"], "Zmlyc3Q=");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "c2Vjb25k");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert!(parts[2]["text"]
            .as_str()
            .unwrap()
            .contains("following location: Paris, France."));
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let gemini_req = GeminiRequest::from_composite_request(&request());
        let json = serde_json::to_value(&gemini_req).unwrap();

        assert!(json.get("generation_config").is_none());
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE"])
        );
    }

    #[test]
    fn test_response_first_inline_image_wins() {
        let image = parse(
            r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here you go"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgoAAAAA"}},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "/9j/4AAAAAAAAAAA"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#,
        )
        .unwrap();

        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.to_base64(), "iVBORw0KGgoAAAAA");
    }

    #[test]
    fn test_response_no_image_data() {
        let result = parse(r#"{"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]}"#);
        assert!(matches!(result, Err(DeemgError::UnexpectedResponse(_))));

        let result = parse(r#"{"candidates": []}"#);
        assert!(matches!(result, Err(DeemgError::UnexpectedResponse(_))));

        let result = parse(r#"{"candidates": [{"finishReason": "STOP"}]}"#);
        assert!(matches!(result, Err(DeemgError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let result = parse(
            r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#,
        );
        match result {
            Err(DeemgError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety");
            }
            other => panic!("expected ContentBlocked, got {other:?}"),
        }
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let result = parse(r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#);
        assert!(matches!(result, Err(DeemgError::ContentBlocked(_))));
    }

    #[test]
    fn test_parse_error_statuses() {
        let headers = HeaderMap::new();
        assert!(matches!(
            parse_error(401, "bad key", &headers),
            DeemgError::Auth(_)
        ));
        assert!(matches!(
            parse_error(429, "slow down", &headers),
            DeemgError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            DeemgError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(400, "request blocked by SAFETY settings", &headers),
            DeemgError::ContentBlocked(_)
        ));
        assert!(matches!(
            parse_error(500, "internal", &headers),
            DeemgError::Api { status: 500, .. }
        ));
    }
}
