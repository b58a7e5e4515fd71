use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use tracing::warn;

/// Injury urgency tier. Exhaustive and without a default: a response that
/// does not name one of these three values is rejected as malformed rather
/// than silently downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Moderate,
    Minor,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Moderate, Severity::Minor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One first-aid step. Order is significant: steps are numbered and read
/// out in sequence downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedyStep {
    pub icon: String,
    pub text_en: String,
    pub text_localized: String,
}

/// Canonical output of a successful classification, serialized camelCase
/// on the wire alongside `"isInjury": true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub injury_type: String,
    pub injury_type_localized: String,
    pub severity: Severity,
    pub confidence: u8,
    pub next_action: String,
    pub next_action_localized: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remedy_steps: Vec<RemedyStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_type_localized: Option<String>,
}

/// Why a classification attempt produced no result. Every reason is
/// recoverable: the captured image is kept and the user may resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    RateLimited,
    QuotaExhausted,
    MalformedResponse,
    NetworkError,
    Unauthenticated,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FailureReason::RateLimited => "rate limit exceeded, try again in a moment",
            FailureReason::QuotaExhausted => "classification credits exhausted",
            FailureReason::MalformedResponse => "classifier returned an invalid assessment",
            FailureReason::NetworkError => "classification request did not complete",
            FailureReason::Unauthenticated => "authentication required",
        };
        f.write_str(msg)
    }
}

/// Mutually exclusive result of a classification attempt. This is the
/// contract between the classification client and its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// The image shows no physical injury. Terminal, not an error.
    NotAnInjury,
    Assessed(AssessmentResult),
    Failed(FailureReason),
}

impl ClassificationOutcome {
    /// Validate a raw endpoint response document. Never panics and never
    /// yields a partially populated result: any schema violation collapses
    /// to `Failed(MalformedResponse)`.
    pub fn from_wire(value: &Value) -> Self {
        match value.get("isInjury").and_then(Value::as_bool) {
            None => {
                warn!("classification response missing boolean isInjury field");
                ClassificationOutcome::Failed(FailureReason::MalformedResponse)
            }
            Some(false) => ClassificationOutcome::NotAnInjury,
            Some(true) => match validated_result(value) {
                Ok(result) => ClassificationOutcome::Assessed(result),
                Err(reason) => {
                    warn!(reason = %reason, "classification response failed validation");
                    ClassificationOutcome::Failed(FailureReason::MalformedResponse)
                }
            },
        }
    }

    /// Wire form of a successful outcome. `Failed` has no 200 body and is
    /// reported through HTTP status codes instead, hence `None`.
    pub fn to_wire(&self) -> Option<Value> {
        match self {
            ClassificationOutcome::NotAnInjury => Some(json!({ "isInjury": false })),
            ClassificationOutcome::Assessed(result) => {
                let mut body =
                    serde_json::to_value(result).expect("assessment result serializes to object");
                body["isInjury"] = json!(true);
                Some(body)
            }
            ClassificationOutcome::Failed(_) => None,
        }
    }
}

fn validated_result(value: &Value) -> Result<AssessmentResult, String> {
    let result: AssessmentResult =
        serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;

    if result.confidence > 100 {
        return Err(format!("confidence {} outside 0-100", result.confidence));
    }

    let required = [
        ("injuryType", &result.injury_type),
        ("injuryTypeLocalized", &result.injury_type_localized),
        ("nextAction", &result.next_action),
        ("nextActionLocalized", &result.next_action_localized),
    ];
    for (field, text) in required {
        if text.trim().is_empty() {
            return Err(format!("required field {field} is empty"));
        }
    }

    for (i, step) in result.remedy_steps.iter().enumerate() {
        if step.text_en.trim().is_empty() || step.text_localized.trim().is_empty() {
            return Err(format!("remedy step {} is missing text", i + 1));
        }
    }

    Ok(result)
}
