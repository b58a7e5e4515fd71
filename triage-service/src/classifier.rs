use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info, warn};

use triage_core::client::Classify;
use triage_core::image::strip_data_url_prefix;
use triage_core::{ClassificationOutcome, FailureReason, Lang};

const GATEWAY_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const CLASSIFIER_MODEL: &str = "google/gemini-2.5-flash";
const MAX_TOKENS: u32 = 1500;

const SYSTEM_PROMPT: &str = r#"You are an emergency first-aid injury assessment AI for India. Analyze the image and respond ONLY with a JSON object (no markdown, no explanation).

IMPORTANT RULES:
1. If the image does NOT show a physical injury (e.g. it's a selfie, landscape, food, object, text, etc.), respond with:
{"isInjury": false}

2. If the image DOES show a physical injury, respond with:
{
  "isInjury": true,
  "injuryType": "Brief injury name in English",
  "injuryTypeLocalized": "Brief injury name in Hindi",
  "severity": "critical" | "moderate" | "minor",
  "confidence": 50-99,
  "nextAction": "1-2 sentence first-aid action in English",
  "nextActionLocalized": "Same first-aid action in Hindi",
  "remedySteps": [
    {"icon": "emoji", "textEn": "Step in English", "textLocalized": "Step in Hindi"},
    ...
  ]
}

The "remedySteps" array MUST contain 4-6 specific, actionable first-aid steps tailored to the EXACT injury shown. Each step must be different and specific to the injury type. Examples:

For a burn: clean water cooling, no ice, no butter/toothpaste, cover with clean cloth, pain relief, when to see doctor.
For a cut: apply pressure, clean wound, antiseptic, bandage, tetanus warning, elevation.
For a fracture: immobilize, do not move, splint if possible, ice pack, call ambulance.
For a sprain: RICE method steps (Rest, Ice, Compress, Elevate).
For a bruise: ice pack, rest, elevation, monitor for worsening.

Do NOT give generic steps. Each remedy must be specific to the injury you identified.

Severity guidelines:
- critical: Deep cuts with heavy bleeding, severe burns, suspected spinal/head injuries, compound fractures
- moderate: Sprains, simple fractures, moderate burns, wounds needing stitches
- minor: Scrapes, small cuts, bruises, minor burns

Be conservative with confidence scores. Never claim 100% confidence."#;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no image provided")]
    EmptyImage,
    #[error("OPENROUTER_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("rate limit exceeded, try again in a moment")]
    RateLimited,
    #[error("AI credits exhausted")]
    QuotaExhausted,
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gateway returned status {0}")]
    Status(u16),
    #[error("no content in gateway response")]
    EmptyContent,
    #[error("gateway content was not valid JSON: {0}")]
    BadContent(String),
}

impl GatewayError {
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            GatewayError::RateLimited => FailureReason::RateLimited,
            GatewayError::QuotaExhausted => FailureReason::QuotaExhausted,
            GatewayError::EmptyContent | GatewayError::BadContent(_) => {
                FailureReason::MalformedResponse
            }
            _ => FailureReason::NetworkError,
        }
    }
}

/// Delegates injury assessment to a vision-and-text model behind the fixed
/// system prompt above. The parsed document is handed back verbatim; the
/// consuming client performs the defensive schema validation.
pub struct VisionClassifier {
    http: Client,
    api_key: String,
}

impl VisionClassifier {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| GatewayError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// One model round-trip: image in, parsed assessment document out.
    pub async fn assess(&self, image_base64: &str) -> Result<Value, GatewayError> {
        let payload = strip_data_url_prefix(image_base64).trim();
        if payload.is_empty() {
            return Err(GatewayError::EmptyImage);
        }

        let body = json!({
            "model": CLASSIFIER_MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image_url",
                            "image_url": { "url": format!("data:image/jpeg;base64,{payload}") }
                        },
                        {
                            "type": "text",
                            "text": "Analyze this image. Is it a physical injury? If yes, assess severity and provide first-aid guidance."
                        }
                    ]
                }
            ]
        });

        let response = self
            .http
            .post(GATEWAY_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            429 => return Err(GatewayError::RateLimited),
            402 => return Err(GatewayError::QuotaExhausted),
            s if !status.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                error!(status = s, detail = %detail, "gateway error");
                return Err(GatewayError::Status(s));
            }
            _ => {}
        }

        let envelope: Value = response.json().await?;
        let content = content_from_gateway(&envelope).ok_or(GatewayError::EmptyContent)?;

        let document = serde_json::from_str::<Value>(strip_markdown_fences(content))
            .map_err(|e| GatewayError::BadContent(e.to_string()))?;

        info!("gateway returned assessment document");
        Ok(document)
    }
}

#[async_trait]
impl Classify for VisionClassifier {
    async fn classify(&self, image_base64: &str, _lang: Lang) -> ClassificationOutcome {
        match self.assess(image_base64).await {
            Ok(document) => ClassificationOutcome::from_wire(&document),
            Err(e) => {
                warn!(error = %e, "gateway classification failed");
                ClassificationOutcome::Failed(e.failure_reason())
            }
        }
    }
}

fn content_from_gateway(envelope: &Value) -> Option<&str> {
    envelope["choices"][0]["message"]["content"].as_str()
}

/// Models occasionally wrap their JSON in markdown fences despite the
/// prompt; strip them before parsing.
fn strip_markdown_fences(content: &str) -> &str {
    let s = content.trim();
    let Some(s) = s.strip_prefix("```") else {
        return s;
    };
    let s = s.strip_prefix("json").unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_unwrapped() {
        let content = "```json\n{\"isInjury\": false}\n```";
        assert_eq!(strip_markdown_fences(content), "{\"isInjury\": false}");
    }

    #[test]
    fn bare_fences_are_unwrapped() {
        let content = "```\n{\"isInjury\": false}\n```";
        assert_eq!(strip_markdown_fences(content), "{\"isInjury\": false}");
    }

    #[test]
    fn unfenced_content_passes_through() {
        assert_eq!(strip_markdown_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn content_is_read_from_first_choice() {
        let envelope = json!({
            "choices": [ { "message": { "content": "{\"isInjury\": false}" } } ]
        });
        assert_eq!(
            content_from_gateway(&envelope),
            Some("{\"isInjury\": false}")
        );
        assert_eq!(content_from_gateway(&json!({ "choices": [] })), None);
    }

    #[test]
    fn gateway_errors_map_to_failure_reasons() {
        assert_eq!(
            GatewayError::RateLimited.failure_reason(),
            FailureReason::RateLimited
        );
        assert_eq!(
            GatewayError::QuotaExhausted.failure_reason(),
            FailureReason::QuotaExhausted
        );
        assert_eq!(
            GatewayError::EmptyContent.failure_reason(),
            FailureReason::MalformedResponse
        );
        assert_eq!(
            GatewayError::Status(500).failure_reason(),
            FailureReason::NetworkError
        );
    }

    #[tokio::test]
    async fn empty_image_is_rejected_before_any_request() {
        let classifier = VisionClassifier::new("test-key");
        let err = classifier
            .assess("data:image/jpeg;base64,")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyImage));
    }

    /// Live round-trip against the gateway.
    /// Usage: OPENROUTER_API_KEY=key cargo test live_gateway -- --ignored
    #[tokio::test]
    #[ignore]
    async fn live_gateway_assessment() {
        let Ok(classifier) = VisionClassifier::from_env() else {
            println!("Skipping test - set OPENROUTER_API_KEY environment variable");
            return;
        };
        // 1x1 px JPEG
        let image = "/9j/4AAQSkZJRgABAQEAAAAAAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8UHRofHh0aHBwgJC4nICIsIxwcKDcpLDAxNDQ0Hyc5PTgyPC4zNDL/wAALCAABAAEBAREA/8QAFAABAAAAAAAAAAAAAAAAAAAACf/EABQQAQAAAAAAAAAAAAAAAAAAAAD/2gAIAQEAAD8AKp//2Q==";
        match classifier.assess(image).await {
            Ok(document) => {
                println!("gateway document: {document}");
                assert!(document.get("isInjury").is_some());
            }
            Err(e) => println!("live gateway test inconclusive: {e}"),
        }
    }
}
