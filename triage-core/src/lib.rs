pub mod assessment;
pub mod capabilities;
pub mod error;
pub mod i18n;
pub mod image;
pub mod remedies;
pub mod session;
pub mod severity;

#[cfg(feature = "client")]
pub mod client;

// Re-export commonly used types
pub use assessment::{
    AssessmentResult, ClassificationOutcome, FailureReason, RemedyStep, Severity,
};
pub use capabilities::{
    AuthState, AuthStateProvider, HospitalDirectory, HospitalEntry, HospitalKind, SpeechPlayback,
};
pub use error::{Result, TriageError};
pub use i18n::{Lang, t};
pub use session::{
    AnalysisTicket, AssessmentSession, InMemorySessionStore, OutcomeDisposition, SessionStore,
};
pub use severity::{Affordances, EMERGENCY_NUMBER, affordances_for};

#[cfg(feature = "client")]
pub use client::{ClassificationClient, Classify};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// End-to-end walk of the pipeline state machine: capture, analyze, a
    /// critical assessment with empty steps, then fallback resolution and
    /// affordance routing.
    #[tokio::test]
    async fn critical_assessment_flow() {
        let store = InMemorySessionStore::new();
        let mut session = AssessmentSession::new();
        session
            .begin_capture("data:image/jpeg;base64,QUJD")
            .unwrap();
        let ticket = session.begin_analysis().unwrap();

        let wire = json!({
            "isInjury": true,
            "severity": "critical",
            "confidence": 92,
            "injuryType": "Deep laceration",
            "injuryTypeLocalized": "गहरा कट",
            "nextAction": "Apply pressure and call emergency services",
            "nextActionLocalized": "दबाव डालें और एम्बुलेंस बुलाएँ",
            "remedySteps": []
        });
        let outcome = ClassificationOutcome::from_wire(&wire);
        let disposition = session.apply_outcome(ticket, outcome).unwrap();
        assert_eq!(disposition, OutcomeDisposition::ShowResult);

        let result = session.result().unwrap().clone();
        store.save(session).await.unwrap();

        // empty classifier steps resolve through the critical fallback list
        let steps = remedies::resolve_steps(&result);
        assert_eq!(steps, remedies::steps_for(Severity::Critical));

        // and the emergency-call affordance is surfaced
        let affordances = affordances_for(result.severity);
        assert!(affordances.show_emergency_call);
        assert_eq!(t(affordances.urgency_label, Lang::Hi), "गंभीर");
    }

    /// A rate-limited attempt resets the in-flight flag but keeps the image,
    /// so the user retries without re-capturing.
    #[test]
    fn rate_limited_attempt_is_recoverable() {
        let mut session = AssessmentSession::new();
        session.begin_capture("QUJD").unwrap();
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
        assert_eq!(session.captured_image(), Some("QUJD"));
        assert!(session.begin_analysis().is_ok());
    }
}
