//! Shared domain primitives for care orchestration.
//!
//! These types sit at the boundary where upstream risk-prediction messages enter the system.
//! Upstream payloads are loosely shaped, so the types here are forgiving on input: a missing or
//! malformed risk level becomes [`RiskLevel::Unknown`] and a missing or malformed probability
//! becomes [`RiskProbability::DEFAULT`]. Neither ever fails deserialisation.

mod measure;
mod risk;

pub use measure::MeasureType;
pub use risk::{RiskLevel, RiskPrediction, RiskProbability};
