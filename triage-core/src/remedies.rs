use crate::assessment::{AssessmentResult, RemedyStep, Severity};

fn step(icon: &str, en: &str, hi: &str) -> RemedyStep {
    RemedyStep {
        icon: icon.to_string(),
        text_en: en.to_string(),
        text_localized: hi.to_string(),
    }
}

/// Static fallback first-aid steps keyed by severity. Total over all three
/// tiers and never empty; used only when the classifier omitted step-level
/// guidance.
pub fn steps_for(severity: Severity) -> Vec<RemedyStep> {
    match severity {
        Severity::Critical => vec![
            step(
                "🩸",
                "Apply firm pressure with a clean cloth to stop bleeding",
                "खून रोकने के लिए साफ कपड़े से मजबूती से दबाएँ",
            ),
            step(
                "🚑",
                "Call ambulance (108) immediately",
                "तुरंत एम्बुलेंस (108) को कॉल करें",
            ),
            step(
                "👁️",
                "Monitor breathing and consciousness",
                "सांस और होश पर नज़र रखें",
            ),
        ],
        Severity::Moderate => vec![
            step(
                "💧",
                "Gently clean wound with clean water",
                "साफ पानी से घाव को धीरे से साफ करें",
            ),
            step("🩹", "Cover with a sterile bandage", "एक साफ पट्टी से ढकें"),
            step(
                "🏥",
                "Visit hospital within 24 hours",
                "24 घंटे के भीतर अस्पताल जाएँ",
            ),
        ],
        Severity::Minor => vec![
            step("🧊", "Rest the injured area", "घायल हिस्से को आराम दें"),
            step(
                "❄️",
                "Apply ice for 15-20 minutes",
                "15-20 मिनट के लिए बर्फ लगाएँ",
            ),
            step(
                "🩹",
                "Compress with an elastic bandage",
                "इलास्टिक पट्टी से दबाएँ",
            ),
        ],
    }
}

/// Precedence rule for downstream guidance screens: the classifier's own
/// injury-specific steps win; the generic catalog is only the fallback.
pub fn resolve_steps(result: &AssessmentResult) -> Vec<RemedyStep> {
    if result.remedy_steps.is_empty() {
        steps_for(result.severity)
    } else {
        result.remedy_steps.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_total_and_never_empty() {
        for severity in Severity::ALL {
            assert!(!steps_for(severity).is_empty(), "no steps for {severity}");
        }
    }

    #[test]
    fn every_step_is_bilingual_with_icon() {
        for severity in Severity::ALL {
            for step in steps_for(severity) {
                assert!(!step.icon.is_empty());
                assert!(!step.text_en.is_empty());
                assert!(!step.text_localized.is_empty());
            }
        }
    }

    #[test]
    fn classifier_steps_take_precedence() {
        let result = AssessmentResult {
            injury_type: "Minor burn".to_string(),
            injury_type_localized: "मामूली जलन".to_string(),
            severity: Severity::Minor,
            confidence: 74,
            next_action: "Cool under running water".to_string(),
            next_action_localized: "बहते पानी से ठंडा करें".to_string(),
            remedy_steps: vec![step("💧", "Cool the burn", "जलन को ठंडा करें")],
            doctor_type: None,
            doctor_type_localized: None,
        };
        let steps = resolve_steps(&result);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].text_en, "Cool the burn");
    }

    #[test]
    fn empty_classifier_steps_fall_back_to_catalog() {
        let result = AssessmentResult {
            injury_type: "Deep laceration".to_string(),
            injury_type_localized: "गहरा कट".to_string(),
            severity: Severity::Critical,
            confidence: 92,
            next_action: "Apply pressure".to_string(),
            next_action_localized: "दबाव डालें".to_string(),
            remedy_steps: vec![],
            doctor_type: None,
            doctor_type_localized: None,
        };
        assert_eq!(resolve_steps(&result), steps_for(Severity::Critical));
    }
}
