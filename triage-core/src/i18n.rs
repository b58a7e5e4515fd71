use serde::{Deserialize, Serialize};

/// Language tag for localized guidance. English is the default when a
/// request carries no hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Hi,
}

// key, English, Hindi
const PHRASES: &[(&str, &str, &str)] = &[
    ("critical", "Critical", "गंभीर"),
    ("moderate", "Moderate", "मध्यम"),
    ("minor", "Minor", "मामूली"),
    ("analyzing", "Analyzing injury…", "चोट का विश्लेषण हो रहा है…"),
    ("notInjuryTitle", "No injury detected", "कोई चोट नहीं मिली"),
    (
        "notInjuryBody",
        "This image doesn't appear to show a physical injury. Please capture a clear photo of the injury.",
        "इस छवि में कोई शारीरिक चोट नहीं दिखाई दे रही। कृपया चोट की स्पष्ट तस्वीर लें।",
    ),
    ("analysisFailed", "Analysis failed", "विश्लेषण विफल"),
    ("retryHint", "Please try again.", "कृपया पुनः प्रयास करें।"),
    ("callAmbulance", "Call 108", "108 पर कॉल करें"),
    ("findHospital", "Find Nearest Hospital", "नज़दीकी अस्पताल खोजें"),
    ("remediesTitle", "Immediate First Aid", "तुरंत प्राथमिक चिकित्सा"),
    ("resultsTitle", "Assessment Results", "आकलन परिणाम"),
];

/// Phrase lookup for the notices and labels the pipeline surfaces. Unknown
/// keys echo back so a missing entry shows up in the UI instead of vanishing.
pub fn t<'a>(key: &'a str, lang: Lang) -> &'a str {
    PHRASES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, en, hi)| match lang {
            Lang::En => *en,
            Lang::Hi => *hi,
        })
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_both_languages() {
        assert_eq!(t("critical", Lang::En), "Critical");
        assert_eq!(t("critical", Lang::Hi), "गंभीर");
    }

    #[test]
    fn unknown_key_echoes_back() {
        assert_eq!(t("noSuchKey", Lang::Hi), "noSuchKey");
    }

    #[test]
    fn default_language_is_english() {
        assert_eq!(Lang::default(), Lang::En);
    }
}
