//! Mapping of QWeather condition labels onto the canonical condition codes
//! understood by display layers.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::LazyLock};

/// Canonical condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    ClearNight,
    Cloudy,
    Fog,
    LightningRainy,
    PartlyCloudy,
    Rainy,
    Pouring,
    Snowy,
    SnowyRainy,
    Exceptional,
    Sunny,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::ClearNight => "clear-night",
            Condition::Cloudy => "cloudy",
            Condition::Fog => "fog",
            Condition::LightningRainy => "lightning-rainy",
            Condition::PartlyCloudy => "partlycloudy",
            Condition::Rainy => "rainy",
            Condition::Pouring => "pouring",
            Condition::Snowy => "snowy",
            Condition::SnowyRainy => "snowy-rainy",
            Condition::Exceptional => "exceptional",
            Condition::Sunny => "sunny",
        }
    }

    pub const fn all() -> &'static [Condition] {
        &[
            Condition::ClearNight,
            Condition::Cloudy,
            Condition::Fog,
            Condition::LightningRainy,
            Condition::PartlyCloudy,
            Condition::Rainy,
            Condition::Pouring,
            Condition::Snowy,
            Condition::SnowyRainy,
            Condition::Exceptional,
            Condition::Sunny,
        ]
    }

    /// Parse a canonical code such as `"snowy-rainy"`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying an upstream label.
///
/// Labels missing from the taxonomy are carried through verbatim instead of
/// being rejected, so a new upstream label degrades to plain text.
///
/// Serialized form is the bare string. Reading it back maps canonical codes to
/// `Known`, so an `Unmapped` label that happens to be spelled like a code (say
/// `"sunny"`) comes back as `Known`. Only the text survives the trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherCondition {
    Known(Condition),
    Unmapped(String),
}

impl WeatherCondition {
    pub fn as_str(&self) -> &str {
        match self {
            WeatherCondition::Known(c) => c.as_str(),
            WeatherCondition::Unmapped(raw) => raw,
        }
    }

    pub fn known(&self) -> Option<Condition> {
        match self {
            WeatherCondition::Known(c) => Some(*c),
            WeatherCondition::Unmapped(_) => None,
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for WeatherCondition {
    fn from(value: String) -> Self {
        match Condition::from_code(&value) {
            Some(c) => WeatherCondition::Known(c),
            None => WeatherCondition::Unmapped(value),
        }
    }
}

impl From<WeatherCondition> for String {
    fn from(value: WeatherCondition) -> Self {
        match value {
            WeatherCondition::Known(c) => c.as_str().to_string(),
            WeatherCondition::Unmapped(raw) => raw,
        }
    }
}

/// Upstream labels accepted for each canonical code. A label must appear
/// under at most one code.
const TAXONOMY: &[(Condition, &[&str])] = &[
    (Condition::ClearNight, &["Clear"]),
    (Condition::Cloudy, &["Overcast"]),
    (
        Condition::Fog,
        &["Mist", "Foggy", "Dense fog", "Strong fog", "Heavy fog", "Extra heavy fog"],
    ),
    (
        Condition::LightningRainy,
        &["Thundershower", "Heavy Thunderstorm", "Thundershower with hail"],
    ),
    (Condition::PartlyCloudy, &["Few Clouds", "Partly Cloudy", "Cloudy"]),
    (
        Condition::Rainy,
        &[
            "Shower Rain",
            "Light Rain",
            "Moderate Rain",
            "Drizzle Rain",
            "Light to moderate rain",
            "Moderate to heavy rain",
            "Rain",
        ],
    ),
    (
        Condition::Pouring,
        &[
            "Heavy Rain",
            "Extreme Rain",
            "Storm",
            "Heavy Storm",
            "Severe Storm",
            "Freezing Rain",
            "Heavy rain to storm",
            "Storm to heavy storm",
            "Heavy to severe storm",
            "Heavy Shower Rain",
        ],
    ),
    (
        Condition::Snowy,
        &[
            "Light Snow",
            "Moderate Snow",
            "Heavy Snow",
            "Snowstorm",
            "Snow Flurry",
            "Light to moderate snow",
            "Moderate to heavy snow",
            "Heavy snow to snowstorm",
            "Snow",
        ],
    ),
    (Condition::SnowyRainy, &["Sleet", "Rain And Snow", "Shower Snow"]),
    (
        Condition::Exceptional,
        &[
            "Haze",
            "Sand",
            "Dust",
            "Duststorm",
            "Sandstorm",
            "Moderate haze",
            "Heavy haze",
            "Severe haze",
            "Hot",
            "Cold",
            "Unknown",
        ],
    ),
    (Condition::Sunny, &["Sunny"]),
];

static LOOKUP: LazyLock<HashMap<&'static str, Condition>> = LazyLock::new(|| {
    TAXONOMY
        .iter()
        .flat_map(|(condition, labels)| labels.iter().map(move |label| (*label, *condition)))
        .collect()
});

/// Classify an upstream condition label.
pub fn classify(text: &str) -> WeatherCondition {
    match LOOKUP.get(text) {
        Some(c) => WeatherCondition::Known(*c),
        None => WeatherCondition::Unmapped(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_label_belongs_to_one_condition() {
        let mut seen = HashSet::new();
        for (_, labels) in TAXONOMY {
            for label in *labels {
                assert!(seen.insert(*label), "label {label:?} listed twice");
            }
        }
        assert_eq!(seen.len(), LOOKUP.len());
    }

    #[test]
    fn taxonomy_covers_every_condition() {
        for c in Condition::all() {
            assert!(TAXONOMY.iter().any(|(t, _)| t == c), "{c} has no labels");
        }
    }

    #[test]
    fn classifies_every_label_into_its_category() {
        for (condition, labels) in TAXONOMY {
            for label in *labels {
                assert_eq!(classify(label), WeatherCondition::Known(*condition));
            }
        }
    }

    #[test]
    fn overcast_and_cloudy_are_not_the_same_category() {
        assert_eq!(classify("Overcast").as_str(), "cloudy");
        assert_eq!(classify("Cloudy").as_str(), "partlycloudy");
    }

    #[test]
    fn unknown_label_passes_through() {
        let c = classify("Volcanic Ash");
        assert_eq!(c, WeatherCondition::Unmapped("Volcanic Ash".to_string()));
        assert_eq!(c.as_str(), "Volcanic Ash");
        assert_eq!(c.known(), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify("sunny").as_str(), "sunny");
        assert!(classify("sunny").known().is_none());
        assert_eq!(classify("Sunny").known(), Some(Condition::Sunny));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&classify("Heavy Snow")).unwrap();
        assert_eq!(json, "\"snowy\"");

        let back: WeatherCondition = serde_json::from_str("\"lightning-rainy\"").unwrap();
        assert_eq!(back, WeatherCondition::Known(Condition::LightningRainy));

        let raw: WeatherCondition = serde_json::from_str("\"Squall\"").unwrap();
        assert_eq!(raw, WeatherCondition::Unmapped("Squall".to_string()));
    }

    #[test]
    fn canonical_code_roundtrip() {
        for c in Condition::all() {
            assert_eq!(Condition::from_code(c.as_str()), Some(*c));
        }
        assert_eq!(Condition::from_code("drizzle"), None);
    }

    #[test]
    fn raw_label_spelled_like_a_code_reads_back_as_known() {
        let raw = classify("sunny");
        assert_eq!(raw, WeatherCondition::Unmapped("sunny".to_string()));

        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(json, "\"sunny\"");
        let back: WeatherCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WeatherCondition::Known(Condition::Sunny));
        assert_eq!(back.as_str(), raw.as_str());
    }
}
