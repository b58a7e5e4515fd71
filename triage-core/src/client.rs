use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::assessment::{ClassificationOutcome, FailureReason};
use crate::i18n::Lang;
use crate::image::strip_data_url_prefix;

/// Seam between the session flow and any classifier: the remote HTTP client
/// below and the service's in-process gateway delegate both implement it.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, image_base64: &str, lang: Lang) -> ClassificationOutcome;
}

/// Submits an encoded image to the remote classification endpoint and
/// normalizes the response. Issues exactly one request per call and never
/// retries; every failure mode is folded into `ClassificationOutcome::Failed`.
pub struct ClassificationClient {
    http: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl ClassificationClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

fn failure_for_status(status: u16) -> FailureReason {
    match status {
        429 => FailureReason::RateLimited,
        402 => FailureReason::QuotaExhausted,
        401 | 403 => FailureReason::Unauthenticated,
        _ => FailureReason::NetworkError,
    }
}

#[async_trait]
impl Classify for ClassificationClient {
    async fn classify(&self, image_base64: &str, lang: Lang) -> ClassificationOutcome {
        let payload = strip_data_url_prefix(image_base64);
        if payload.trim().is_empty() {
            warn!("refusing to submit empty image payload");
            return ClassificationOutcome::Failed(FailureReason::NetworkError);
        }

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "imageBase64": payload, "language": lang }));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "classification request failed to complete");
                return ClassificationOutcome::Failed(FailureReason::NetworkError);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "classification endpoint returned error status");
            return ClassificationOutcome::Failed(failure_for_status(status.as_u16()));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "classification response body was not JSON");
                return ClassificationOutcome::Failed(FailureReason::MalformedResponse);
            }
        };

        debug!("classification response received, validating");
        ClassificationOutcome::from_wire(&body)
    }
}
