//! Member/gap records from `enhanced_member_data.json`.

use crate::data_files::read_json;
use crate::{CareError, CareResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// One member/gap record, kept exactly as it appears in the file.
///
/// Records are not validated; the accessors read what they need and treat anything missing or
/// oddly typed as absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberRecord(Value);

impl MemberRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// The member id when it is a string; numeric ids are never matched against a lookup key.
    pub fn member_id(&self) -> Option<&str> {
        self.field("member_id").and_then(Value::as_str)
    }

    pub fn measure_type(&self) -> Option<&str> {
        self.field("measure_type").and_then(Value::as_str)
    }

    pub fn risk_level(&self) -> Option<&str> {
        self.field("risk_level").and_then(Value::as_str)
    }

    /// JSON truthiness of `evidence_found`.
    pub fn has_evidence(&self) -> bool {
        self.field("evidence_found").is_some_and(is_truthy)
    }

    /// Grouping key for the evidence source; `None` when the field is missing or falsy.
    pub fn evidence_source(&self) -> Option<String> {
        match self.field("evidence_source")? {
            Value::String(source) if !source.is_empty() => Some(source.clone()),
            Value::String(_) => None,
            other if is_truthy(other) => Some(other.to_string()),
            _ => None,
        }
    }

    /// A numeric entry of `cost_impact`; zero when missing or not a number.
    pub fn cost(&self, key: &str) -> f64 {
        self.field("cost_impact")
            .and_then(|cost| cost.get(key))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The single record served by list endpoints when the member file is absent.
pub fn fallback_members() -> Vec<MemberRecord> {
    vec![MemberRecord(json!({
        "member_id": "99990001000000",
        "name": "Maria Rodriguez",
        "age": 35,
        "measure_type": "CCS",
        "risk_level": "LOW",
        "evidence_found": true,
        "evidence_source": "HL7_MDM_PDF",
        "processing_time": 0.05
    }))]
}

/// Read-only view over the member data file. The file is re-read on every call.
#[derive(Clone, Debug)]
pub struct MemberDataSource {
    path: PathBuf,
}

impl MemberDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records; [`CareError::DataFileMissing`] when the file is absent.
    pub fn load(&self) -> CareResult<Vec<MemberRecord>> {
        read_json(&self.path)
    }

    /// All records, or [`fallback_members`] when the file is absent.
    pub fn load_or_fallback(&self) -> CareResult<Vec<MemberRecord>> {
        match self.load() {
            Ok(members) => Ok(members),
            Err(CareError::DataFileMissing(path)) => {
                tracing::warn!(path = %path.display(), "Member data file absent, serving fallback");
                Ok(fallback_members())
            }
            Err(err) => Err(err),
        }
    }

    /// The record whose `member_id` matches exactly.
    pub fn find(&self, member_id: &str) -> CareResult<Option<MemberRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|member| member.member_id() == Some(member_id)))
    }
}
