use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::assessment::{AssessmentResult, ClassificationOutcome, FailureReason};
use crate::error::{Result, TriageError};

/// Pairs an in-flight analysis with the session generation that issued it.
/// `apply_outcome` rejects a ticket whose epoch no longer matches, so a
/// response that arrives after the user re-captured or left the flow is
/// discarded instead of overwriting fresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisTicket {
    epoch: u64,
}

/// What the caller should display after an outcome is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "camelCase")]
pub enum OutcomeDisposition {
    /// A validated result is stored; show the results screen.
    ShowResult,
    /// Informational notice, not an error: retake a clearer photo.
    NotAnInjuryNotice,
    /// Error notice; the captured image is kept for retry.
    FailureNotice(FailureReason),
}

/// Single-flow assessment state: the captured image, the current result and
/// the in-flight flag. Created fresh per visit, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSession {
    pub id: String,
    captured_image: Option<String>,
    result: Option<AssessmentResult>,
    is_analyzing: bool,
    epoch: u64,
}

impl AssessmentSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            captured_image: None,
            result: None,
            is_analyzing: false,
            epoch: 0,
        }
    }

    pub fn captured_image(&self) -> Option<&str> {
        self.captured_image.as_deref()
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    /// Store a freshly captured image and clear any prior result. Bumps the
    /// epoch so an outcome from a previous capture can no longer land.
    pub fn begin_capture(&mut self, image: impl Into<String>) -> Result<()> {
        let image = image.into();
        if image.trim().is_empty() {
            return Err(TriageError::EmptyImage);
        }
        self.captured_image = Some(image);
        self.result = None;
        self.is_analyzing = false;
        self.epoch += 1;
        debug!(session_id = %self.id, epoch = self.epoch, "image captured");
        Ok(())
    }

    /// Mark the single suspension point of the flow as entered. Calling this
    /// without a captured image is a programmer error and fails loudly.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket> {
        if self.captured_image.is_none() {
            return Err(TriageError::NoCapturedImage);
        }
        self.is_analyzing = true;
        self.epoch += 1;
        debug!(session_id = %self.id, epoch = self.epoch, "analysis started");
        Ok(AnalysisTicket { epoch: self.epoch })
    }

    /// Apply a classification outcome. On `Assessed` the result is stored;
    /// on `NotAnInjury` and `Failed` only `is_analyzing` resets, keeping the
    /// image so the user can retry without re-capturing.
    pub fn apply_outcome(
        &mut self,
        ticket: AnalysisTicket,
        outcome: ClassificationOutcome,
    ) -> Result<OutcomeDisposition> {
        if !self.is_analyzing || ticket.epoch != self.epoch {
            return Err(TriageError::StaleOutcome {
                ticket: ticket.epoch,
                current: self.epoch,
            });
        }
        self.is_analyzing = false;
        match outcome {
            ClassificationOutcome::Assessed(result) => {
                info!(
                    session_id = %self.id,
                    severity = %result.severity,
                    confidence = result.confidence,
                    "assessment stored"
                );
                self.result = Some(result);
                Ok(OutcomeDisposition::ShowResult)
            }
            ClassificationOutcome::NotAnInjury => {
                info!(session_id = %self.id, "no injury detected, returning to capture");
                Ok(OutcomeDisposition::NotAnInjuryNotice)
            }
            ClassificationOutcome::Failed(reason) => {
                info!(session_id = %self.id, reason = %reason, "classification failed, image kept for retry");
                Ok(OutcomeDisposition::FailureNotice(reason))
            }
        }
    }

    /// Clear everything; used when leaving the flow. Idempotent.
    pub fn reset(&mut self) {
        self.captured_image = None;
        self.result = None;
        self.is_analyzing = false;
        self.epoch += 1;
    }
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for storing and retrieving assessment sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: AssessmentSession) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<AssessmentSession>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of `SessionStore`. Sessions have no persistence
/// beyond the process lifetime.
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, AssessmentSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: AssessmentSession) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<AssessmentSession>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Severity;

    const IMAGE: &str = "data:image/jpeg;base64,QUJD";

    fn critical_result() -> AssessmentResult {
        AssessmentResult {
            injury_type: "Deep laceration".to_string(),
            injury_type_localized: "गहरा कट".to_string(),
            severity: Severity::Critical,
            confidence: 92,
            next_action: "Apply pressure and call emergency services".to_string(),
            next_action_localized: "दबाव डालें और एम्बुलेंस बुलाएँ".to_string(),
            remedy_steps: vec![],
            doctor_type: None,
            doctor_type_localized: None,
        }
    }

    #[test]
    fn capture_requires_non_empty_image() {
        let mut session = AssessmentSession::new();
        assert!(matches!(
            session.begin_capture("   "),
            Err(TriageError::EmptyImage)
        ));
        assert!(session.captured_image().is_none());
    }

    #[test]
    fn analysis_without_image_fails_loudly() {
        let mut session = AssessmentSession::new();
        assert!(matches!(
            session.begin_analysis(),
            Err(TriageError::NoCapturedImage)
        ));
    }

    #[test]
    fn assessed_outcome_is_stored_and_flag_clears() {
        let mut session = AssessmentSession::new();
        session.begin_capture(IMAGE).unwrap();
        let ticket = session.begin_analysis().unwrap();
        assert!(session.is_analyzing());

        let disposition = session
            .apply_outcome(
                ticket,
                ClassificationOutcome::Assessed(critical_result()),
            )
            .unwrap();

        assert_eq!(disposition, OutcomeDisposition::ShowResult);
        assert!(!session.is_analyzing());
        assert_eq!(session.result().unwrap().severity, Severity::Critical);
        assert_eq!(session.captured_image(), Some(IMAGE));
    }

    #[test]
    fn not_an_injury_leaves_result_unset() {
        let mut session = AssessmentSession::new();
        session.begin_capture(IMAGE).unwrap();
        let ticket = session.begin_analysis().unwrap();

        let disposition = session
            .apply_outcome(ticket, ClassificationOutcome::NotAnInjury)
            .unwrap();

        assert_eq!(disposition, OutcomeDisposition::NotAnInjuryNotice);
        assert!(session.result().is_none());
        assert!(!session.is_analyzing());
        assert_eq!(session.captured_image(), Some(IMAGE));
    }

    #[test]
    fn failure_keeps_image_for_retry() {
        let mut session = AssessmentSession::new();
        session.begin_capture(IMAGE).unwrap();
        let ticket = session.begin_analysis().unwrap();

        let disposition = session
            .apply_outcome(
                ticket,
                ClassificationOutcome::Failed(FailureReason::RateLimited),
            )
            .unwrap();

        assert_eq!(
            disposition,
            OutcomeDisposition::FailureNotice(FailureReason::RateLimited)
        );
        assert!(!session.is_analyzing());
        assert_eq!(session.captured_image(), Some(IMAGE));
        // retry is possible without re-capturing
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn stale_outcome_after_recapture_is_discarded() {
        let mut session = AssessmentSession::new();
        session.begin_capture(IMAGE).unwrap();
        let ticket = session.begin_analysis().unwrap();

        // user retakes the photo while the request is in flight
        session.begin_capture("data:image/jpeg;base64,REVG").unwrap();

        let err = session
            .apply_outcome(
                ticket,
                ClassificationOutcome::Assessed(critical_result()),
            )
            .unwrap_err();
        assert!(matches!(err, TriageError::StaleOutcome { .. }));
        assert!(session.result().is_none());
    }

    #[test]
    fn stale_outcome_after_reset_is_discarded() {
        let mut session = AssessmentSession::new();
        session.begin_capture(IMAGE).unwrap();
        let ticket = session.begin_analysis().unwrap();

        session.reset();

        let err = session
            .apply_outcome(ticket, ClassificationOutcome::NotAnInjury)
            .unwrap_err();
        assert!(matches!(err, TriageError::StaleOutcome { .. }));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut session = AssessmentSession::new();
        session.begin_capture(IMAGE).unwrap();
        let ticket = session.begin_analysis().unwrap();
        session
            .apply_outcome(
                ticket,
                ClassificationOutcome::Assessed(critical_result()),
            )
            .unwrap();

        session.reset();
        session.reset();

        assert!(session.captured_image().is_none());
        assert!(session.result().is_none());
        assert!(!session.is_analyzing());
    }

    #[tokio::test]
    async fn store_round_trips_sessions() {
        let store = InMemorySessionStore::new();
        let mut session = AssessmentSession::with_id("session1");
        session.begin_capture(IMAGE).unwrap();
        store.save(session).await.unwrap();

        let loaded = store.get("session1").await.unwrap().unwrap();
        assert_eq!(loaded.captured_image(), Some(IMAGE));

        store.delete("session1").await.unwrap();
        assert!(store.get("session1").await.unwrap().is_none());
    }
}
