//! Synthetic FHIR `Patient` resources.
//!
//! Members arrive as an opaque id and an age, so the patient resource is necessarily
//! synthetic:
//! - the display name is anonymised to `Member{last four characters of the id}`
//! - the birth date is January 1 of (current year − age), a coarse approximation
//! - the gender follows a fixed age-band placeholder policy (see [`synthetic_gender`])

use crate::datatypes::{CodeableConcept, Coding};
use crate::systems;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire types
// ============================================================================

/// FHIR administrative gender, restricted to the values this service emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Female,
    Unknown,
}

/// Purpose of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierUse {
    Usual,
}

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    Official,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "use")]
    pub use_type: IdentifierUse,
    #[serde(rename = "type")]
    pub id_type: CodeableConcept,
    pub system: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(rename = "use")]
    pub use_type: NameUse,
    pub family: String,
    pub given: Vec<String>,
}

/// FHIR `Patient` as synthesized for a plan member.
///
/// The `resourceType` discriminator is emitted by [`crate::FhirResource`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResource {
    pub id: String,
    pub identifier: Vec<Identifier>,
    pub active: bool,
    pub name: Vec<HumanName>,
    pub gender: AdministrativeGender,
    pub birth_date: String,
}

// ============================================================================
// Builders
// ============================================================================

/// Logical id of the patient resource for `member_id`.
pub fn patient_id(member_id: &str) -> String {
    format!("patient-{member_id}")
}

/// Literal reference (`Patient/patient-{member_id}`) used as `subject` by every other resource.
pub fn patient_reference(member_id: &str) -> String {
    format!("Patient/{}", patient_id(member_id))
}

/// Builds the patient resource for a member.
///
/// The resource is always active and always carries exactly one `usual` MR identifier whose
/// value is the member id.
pub fn build_patient(member_id: &str, member_age: u32, now: DateTime<Utc>) -> PatientResource {
    PatientResource {
        id: patient_id(member_id),
        identifier: vec![Identifier {
            use_type: IdentifierUse::Usual,
            id_type: CodeableConcept::coded(Coding::new(
                systems::IDENTIFIER_TYPE,
                "MR",
                "Medical Record Number",
            )),
            system: systems::MEMBER_ID.to_string(),
            value: member_id.to_string(),
        }],
        active: true,
        name: vec![HumanName {
            use_type: NameUse::Official,
            family: format!("Member{}", last_four(member_id)),
            given: vec!["Anonymous".to_string()],
        }],
        gender: synthetic_gender(member_age),
        birth_date: synthetic_birth_date(member_age, now),
    }
}

/// Placeholder gender policy: `female` for ages 24 through 64 inclusive, `unknown` otherwise.
///
/// This mirrors the eligibility band of the cervical screening measure. It is not a model of
/// the member's sex.
pub fn synthetic_gender(member_age: u32) -> AdministrativeGender {
    if (24..=64).contains(&member_age) {
        AdministrativeGender::Female
    } else {
        AdministrativeGender::Unknown
    }
}

/// January 1 of (year of `now` − `member_age`), as `YYYY-01-01`.
pub fn synthetic_birth_date(member_age: u32, now: DateTime<Utc>) -> String {
    let birth_year = i64::from(now.year()) - i64::from(member_age);
    format!("{birth_year}-01-01")
}

fn last_four(member_id: &str) -> String {
    let chars: Vec<char> = member_id.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}
