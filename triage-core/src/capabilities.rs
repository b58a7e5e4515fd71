//! Capability interfaces for external collaborators. They consume the
//! pipeline's output but are never part of its contract: the core compiles
//! and runs with none of them present.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assessment::RemedyStep;
use crate::i18n::Lang;

/// Authentication state supplied externally; gates submit-for-analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

pub trait AuthStateProvider: Send + Sync {
    fn auth_state(&self) -> AuthState;
}

/// Fire-and-forget text-to-speech playback.
pub trait SpeechPlayback: Send + Sync {
    fn speak(&self, text: &str, lang: Lang);
}

/// Joins ordered remedy steps into one utterance for voice readout.
pub fn readout_text(steps: &[RemedyStep], lang: Lang) -> String {
    steps
        .iter()
        .map(|s| match lang {
            Lang::En => s.text_en.as_str(),
            Lang::Hi => s.text_localized.as_str(),
        })
        .collect::<Vec<_>>()
        .join(". ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HospitalKind {
    Govt,
    Private,
}

/// One nearby-hospital directory entry, shaped for the map screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalEntry {
    pub name: String,
    pub name_localized: String,
    pub kind: HospitalKind,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub rating: f32,
    pub is_24x7: bool,
    pub phone: String,
    pub lat: f64,
    pub lng: f64,
}

/// External directory service returning hospitals sorted by proximity.
#[async_trait]
pub trait HospitalDirectory: Send + Sync {
    async fn nearby(&self, lat: f64, lng: f64) -> Vec<HospitalEntry>;
}
