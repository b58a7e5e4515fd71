use serde::{Deserialize, Serialize};
use triage_core::{Affordances, AssessmentResult, Lang, OutcomeDisposition, RemedyStep};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
    pub image_base64: String,
    #[serde(default)]
    pub language: Lang,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub image_base64: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub language: Lang,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub disposition: OutcomeDisposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
    /// Resolved guidance: the classifier's own steps when present, the
    /// severity catalog otherwise. Empty unless the disposition is ShowResult.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remedy_steps: Vec<RemedyStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affordances: Option<Affordances>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub has_captured_image: bool,
    pub is_analyzing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}
