use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// HEDIS quality-measure code.
///
/// Codes are matched exactly as sent upstream. Codes without a dedicated variant are carried
/// verbatim in [`MeasureType::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MeasureType {
    /// Cervical Cancer Screening.
    Ccs,
    /// Well-Child Visits.
    Wcv,
    /// Colorectal Cancer Screening.
    Col,
    Other(String),
}

impl MeasureType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ccs => "CCS",
            Self::Wcv => "WCV",
            Self::Col => "COL",
            Self::Other(code) => code,
        }
    }

    /// Human-readable measure name. Unknown codes display as themselves.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ccs => "Cervical Cancer Screening",
            Self::Wcv => "Well-Child Visits",
            Self::Col => "Colorectal Cancer Screening",
            Self::Other(code) => code,
        }
    }

    /// Lower-cased code, used when deriving resource ids.
    pub fn id_fragment(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl From<&str> for MeasureType {
    fn from(code: &str) -> Self {
        match code {
            "CCS" => Self::Ccs,
            "WCV" => Self::Wcv,
            "COL" => Self::Col,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for MeasureType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "CCS" | "WCV" | "COL" => Self::from(code.as_str()),
            _ => Self::Other(code),
        }
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Ordered by code so that measure-keyed maps iterate alphabetically.
impl Ord for MeasureType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for MeasureType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for MeasureType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MeasureType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(MeasureType::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn known_codes_map_to_variants() {
        assert_eq!(MeasureType::from("CCS"), MeasureType::Ccs);
        assert_eq!(MeasureType::from("WCV".to_string()), MeasureType::Wcv);
        assert_eq!(MeasureType::from("COL"), MeasureType::Col);
        assert_eq!(
            MeasureType::from("BCS"),
            MeasureType::Other("BCS".to_string())
        );
    }

    #[test]
    fn codes_are_case_sensitive() {
        assert_eq!(
            MeasureType::from("ccs"),
            MeasureType::Other("ccs".to_string())
        );
    }

    #[test]
    fn map_keys_iterate_alphabetically() {
        let map: BTreeMap<MeasureType, u8> =
            serde_json::from_str(r#"{"WCV": 1, "BCS": 2, "CCS": 3, "COL": 4}"#).unwrap();
        let codes: Vec<&str> = map.keys().map(MeasureType::as_str).collect();
        assert_eq!(codes, vec!["BCS", "CCS", "COL", "WCV"]);
    }

    #[test]
    fn display_names() {
        assert_eq!(MeasureType::Ccs.display_name(), "Cervical Cancer Screening");
        assert_eq!(MeasureType::Wcv.display_name(), "Well-Child Visits");
        assert_eq!(MeasureType::from("BCS").display_name(), "BCS");
        assert_eq!(MeasureType::Wcv.id_fragment(), "wcv");
    }
}
