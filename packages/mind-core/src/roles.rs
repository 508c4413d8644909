use crate::synth::SignalKind;
use crate::types::{NamedSeries, SeriesCollection};
use serde::{Deserialize, Serialize};

/// Clinical role a vitals series can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    Ecg,
    ArterialPressure,
    Pleth,
    Respiration,
    HeartRate,
    SpO2,
    MeanArterialPressure,
}

/// Role → substrings matched case-insensitively against series names.
///
/// Matching is plain substring search, so short patterns are greedy:
/// "art" also matches "heart", "sat" matches "saturation_offset".
const ROLE_PATTERNS: &[(SeriesRole, &[&str])] = &[
    (SeriesRole::Ecg, &["ecg"]),
    (SeriesRole::ArterialPressure, &["abp", "arterial", "art"]),
    (SeriesRole::Pleth, &["pleth"]),
    (SeriesRole::Respiration, &["resp", "impedance"]),
    (SeriesRole::HeartRate, &["hr", "heart"]),
    (SeriesRole::SpO2, &["spo2", "sao2", "sat"]),
    (SeriesRole::MeanArterialPressure, &["map", "mean"]),
];

/// Roles shown on the live waveform display, in display order.
pub const WAVEFORM_ROLES: &[SeriesRole] = &[
    SeriesRole::Ecg,
    SeriesRole::ArterialPressure,
    SeriesRole::Pleth,
    SeriesRole::Respiration,
];

/// Roles shown on the numerics trend display, in display order.
pub const NUMERIC_ROLES: &[SeriesRole] = &[
    SeriesRole::HeartRate,
    SeriesRole::SpO2,
    SeriesRole::MeanArterialPressure,
];

impl SeriesRole {
    pub fn patterns(&self) -> &'static [&'static str] {
        ROLE_PATTERNS
            .iter()
            .find(|(role, _)| role == self)
            .map(|(_, patterns)| *patterns)
            .unwrap_or(&[])
    }

    /// Whether `name` contains any of this role's patterns.
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.patterns().iter().any(|p| lower.contains(p))
    }

    /// Placeholder generator for roles that can be synthesized.
    pub fn fallback(&self) -> Option<SignalKind> {
        match self {
            SeriesRole::Ecg => Some(SignalKind::Ecg),
            SeriesRole::ArterialPressure => Some(SignalKind::ArterialPressure),
            SeriesRole::HeartRate => Some(SignalKind::HeartRate),
            SeriesRole::SpO2 => Some(SignalKind::SpO2),
            SeriesRole::MeanArterialPressure => Some(SignalKind::MeanArterialPressure),
            SeriesRole::Pleth | SeriesRole::Respiration => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SeriesRole::Ecg => "ecg",
            SeriesRole::ArterialPressure => "abp",
            SeriesRole::Pleth => "pleth",
            SeriesRole::Respiration => "resp",
            SeriesRole::HeartRate => "hr",
            SeriesRole::SpO2 => "spo2",
            SeriesRole::MeanArterialPressure => "map",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeriesRole::Pleth => "Plethysmograph",
            SeriesRole::Respiration => "Respiration",
            other => other.fallback().map(|k| k.label()).unwrap_or(""),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SeriesRole::Pleth => "a.u.",
            SeriesRole::Respiration => "Ω",
            other => other.fallback().map(|k| k.unit()).unwrap_or(""),
        }
    }
}

/// First series in container order whose name matches `role`.
pub fn find_series(collection: &SeriesCollection, role: SeriesRole) -> Option<&NamedSeries> {
    collection.series.iter().find(|s| role.matches(&s.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(names: &[&str]) -> SeriesCollection {
        SeriesCollection {
            series: names
                .iter()
                .map(|n| NamedSeries {
                    name: n.to_string(),
                    time: vec![1.0, 2.0],
                    values: vec![0.0, 0.0],
                })
                .collect(),
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert!(SeriesRole::Ecg.matches("ECG_II"));
        assert!(SeriesRole::ArterialPressure.matches("Arterial_Line"));
        assert!(SeriesRole::Respiration.matches("Thoracic Impedance"));
        assert!(SeriesRole::SpO2.matches("SaO2"));
        assert!(!SeriesRole::Pleth.matches("ECG"));
    }

    #[test]
    fn test_first_match_in_container_order_wins() {
        let c = collection(&["Pleth", "ABP_2", "ABP_1"]);
        assert_eq!(find_series(&c, SeriesRole::ArterialPressure).unwrap().name, "ABP_2");
        assert!(find_series(&c, SeriesRole::Ecg).is_none());
    }

    #[test]
    fn test_short_patterns_are_greedy() {
        // "art" inside "heart" claims it for arterial pressure.
        assert!(SeriesRole::ArterialPressure.matches("HeartRate"));
        let c = collection(&["HeartRate", "ABP"]);
        assert_eq!(find_series(&c, SeriesRole::ArterialPressure).unwrap().name, "HeartRate");
        assert_eq!(find_series(&c, SeriesRole::HeartRate).unwrap().name, "HeartRate");
    }

    #[test]
    fn test_every_role_has_patterns() {
        for role in WAVEFORM_ROLES.iter().chain(NUMERIC_ROLES) {
            assert!(!role.patterns().is_empty());
            assert!(!role.label().is_empty());
        }
    }
}
