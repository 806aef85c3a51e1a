use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Upstream risk tier for a single quality measure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    /// Missing, null or unrecognised upstream value.
    #[default]
    Unknown,
}

impl RiskLevel {
    /// Parses an upstream risk level. Matching ignores case and surrounding whitespace;
    /// anything unrecognised is [`RiskLevel::Unknown`].
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Self::High,
            "MEDIUM" => Self::Medium,
            "LOW" => Self::Low,
            _ => Self::Unknown,
        }
    }

    /// Upper-case wire form (`HIGH`, `MEDIUM`, `LOW`, `UNKNOWN`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Lower-case coding value used in FHIR `qualitativeRisk` codings.
    pub fn code(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RiskLevelVisitor)
    }
}

struct RiskLevelVisitor;

impl<'de> Visitor<'de> for RiskLevelVisitor {
    type Value = RiskLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a risk level string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RiskLevel, E> {
        Ok(RiskLevel::parse(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<RiskLevel, E> {
        Ok(RiskLevel::Unknown)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RiskLevel, E> {
        Ok(RiskLevel::Unknown)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RiskLevel, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<RiskLevel, E> {
        Ok(RiskLevel::Unknown)
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<RiskLevel, E> {
        Ok(RiskLevel::Unknown)
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<RiskLevel, E> {
        Ok(RiskLevel::Unknown)
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<RiskLevel, E> {
        Ok(RiskLevel::Unknown)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RiskLevel, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RiskLevel::Unknown)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RiskLevel, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RiskLevel::Unknown)
    }
}

/// Upstream probability that a member will not close a gap without intervention.
///
/// Values are carried as given; no clamping to `[0, 1]` is applied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RiskProbability(f64);

impl RiskProbability {
    /// Probability assumed when upstream omits one.
    pub const DEFAULT: RiskProbability = RiskProbability(0.5);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Percentage with one decimal place, e.g. `85.0%`.
    pub fn as_percentage(self) -> String {
        format!("{:.1}%", self.0 * 100.0)
    }
}

impl Default for RiskProbability {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<'de> Deserialize<'de> for RiskProbability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RiskProbabilityVisitor)
    }
}

struct RiskProbabilityVisitor;

impl<'de> Visitor<'de> for RiskProbabilityVisitor {
    type Value = RiskProbability;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a probability")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RiskProbability, E> {
        Ok(RiskProbability(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RiskProbability, E> {
        Ok(RiskProbability(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RiskProbability, E> {
        Ok(RiskProbability(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RiskProbability, E> {
        Ok(v
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(RiskProbability)
            .unwrap_or_default())
    }

    fn visit_none<E: de::Error>(self) -> Result<RiskProbability, E> {
        Ok(RiskProbability::DEFAULT)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RiskProbability, E> {
        Ok(RiskProbability::DEFAULT)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<RiskProbability, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<RiskProbability, E> {
        Ok(RiskProbability::DEFAULT)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RiskProbability, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RiskProbability::DEFAULT)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RiskProbability, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RiskProbability::DEFAULT)
    }
}

/// One upstream prediction for one quality measure.
///
/// Both fields default when absent, so `{}` is a valid prediction (`UNKNOWN`, `0.5`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_probability: RiskProbability,
}

impl RiskPrediction {
    pub fn new(risk_level: RiskLevel, risk_probability: f64) -> Self {
        Self {
            risk_level,
            risk_probability: RiskProbability::new(risk_probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RiskPrediction {
        serde_json::from_str(json).expect("lenient parse")
    }

    #[test]
    fn parses_known_levels() {
        assert_eq!(RiskLevel::parse("HIGH"), RiskLevel::High);
        assert_eq!(RiskLevel::parse("medium"), RiskLevel::Medium);
        assert_eq!(RiskLevel::parse(" Low "), RiskLevel::Low);
        assert_eq!(RiskLevel::parse("SEVERE"), RiskLevel::Unknown);
    }

    #[test]
    fn absent_fields_take_defaults() {
        let p = parse("{}");
        assert_eq!(p.risk_level, RiskLevel::Unknown);
        assert_eq!(p.risk_probability, RiskProbability::DEFAULT);
    }

    #[test]
    fn null_and_malformed_fields_take_defaults() {
        let p = parse(r#"{"risk_level": null, "risk_probability": null}"#);
        assert_eq!(p.risk_level, RiskLevel::Unknown);
        assert_eq!(p.risk_probability.value(), 0.5);

        let p = parse(r#"{"risk_level": 3, "risk_probability": {"nested": [1, 2]}}"#);
        assert_eq!(p.risk_level, RiskLevel::Unknown);
        assert_eq!(p.risk_probability.value(), 0.5);

        let p = parse(r#"{"risk_level": ["HIGH"], "risk_probability": "not a number"}"#);
        assert_eq!(p.risk_level, RiskLevel::Unknown);
        assert_eq!(p.risk_probability.value(), 0.5);
    }

    #[test]
    fn zero_probability_is_kept() {
        let p = parse(r#"{"risk_level": "LOW", "risk_probability": 0}"#);
        assert_eq!(p.risk_probability.value(), 0.0);
    }

    #[test]
    fn numeric_string_probability_is_accepted() {
        let p = parse(r#"{"risk_probability": "0.25"}"#);
        assert_eq!(p.risk_probability.value(), 0.25);
    }

    #[test]
    fn ignores_extra_upstream_fields() {
        let p = parse(
            r#"{"measure_type": "CCS", "risk_level": "HIGH",
                "risk_probability": 0.85, "model_version": "1.0"}"#,
        );
        assert_eq!(p, RiskPrediction::new(RiskLevel::High, 0.85));
    }

    #[test]
    fn percentage_has_one_decimal() {
        assert_eq!(RiskProbability::new(0.85).as_percentage(), "85.0%");
        assert_eq!(RiskProbability::new(0.1234).as_percentage(), "12.3%");
    }

    #[test]
    fn serialises_upper_case() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
        assert_eq!(RiskLevel::Medium.code(), "medium");
    }
}
