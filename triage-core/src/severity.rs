use serde::Serialize;

use crate::assessment::Severity;

/// National emergency ambulance number surfaced by the emergency-call
/// affordance.
pub const EMERGENCY_NUMBER: &str = "108";

/// UI affordances required for a given severity. `urgency_label` is the
/// phrasebook key of the severity badge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub show_emergency_call: bool,
    pub urgency_label: &'static str,
}

/// Single source of truth for severity-conditional UI. Every screen that
/// conditionally renders the emergency-call action consults this instead of
/// comparing against `"critical"` itself, so the mapping cannot drift if the
/// severity set grows.
pub fn affordances_for(severity: Severity) -> Affordances {
    Affordances {
        show_emergency_call: matches!(severity, Severity::Critical),
        urgency_label: severity.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_surfaces_emergency_call() {
        assert!(affordances_for(Severity::Critical).show_emergency_call);
    }

    #[test]
    fn lower_tiers_do_not_surface_emergency_call() {
        assert!(!affordances_for(Severity::Moderate).show_emergency_call);
        assert!(!affordances_for(Severity::Minor).show_emergency_call);
    }

    #[test]
    fn urgency_labels_match_severity_keys() {
        for severity in Severity::ALL {
            assert_eq!(affordances_for(severity).urgency_label, severity.as_str());
        }
    }
}
