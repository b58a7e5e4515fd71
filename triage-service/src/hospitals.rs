use async_trait::async_trait;
use std::cmp::Ordering;

use triage_core::{HospitalDirectory, HospitalEntry, HospitalKind};

/// Built-in directory of nearby hospitals. Stands in for an external
/// directory service; entries are returned sorted by proximity.
pub struct StaticHospitalDirectory {
    entries: Vec<HospitalEntry>,
}

fn entry(
    name: &str,
    name_localized: &str,
    kind: HospitalKind,
    distance_km: f64,
    eta_minutes: u32,
    rating: f32,
    is_24x7: bool,
    phone: &str,
    lat: f64,
    lng: f64,
) -> HospitalEntry {
    HospitalEntry {
        name: name.to_string(),
        name_localized: name_localized.to_string(),
        kind,
        distance_km,
        eta_minutes,
        rating,
        is_24x7,
        phone: phone.to_string(),
        lat,
        lng,
    }
}

impl StaticHospitalDirectory {
    pub fn new() -> Self {
        Self {
            entries: vec![
                entry(
                    "Community Health Centre",
                    "सामुदायिक स्वास्थ्य केंद्र",
                    HospitalKind::Govt,
                    5.1,
                    18,
                    3.8,
                    false,
                    "+911234567892",
                    28.6339,
                    77.225,
                ),
                entry(
                    "District Government Hospital",
                    "जिला सरकारी अस्पताल",
                    HospitalKind::Govt,
                    2.3,
                    8,
                    4.1,
                    true,
                    "+911234567890",
                    28.6139,
                    77.209,
                ),
                entry(
                    "City Care Private Hospital",
                    "सिटी केयर प्राइवेट अस्पताल",
                    HospitalKind::Private,
                    3.8,
                    14,
                    4.5,
                    true,
                    "+911234567891",
                    28.6229,
                    77.218,
                ),
            ],
        }
    }
}

impl Default for StaticHospitalDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HospitalDirectory for StaticHospitalDirectory {
    async fn nearby(&self, _lat: f64, _lng: f64) -> Vec<HospitalEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        });
        entries
    }
}
