//! Analytics derived from the sample files.
//!
//! - [`CareManagementStats`]: counts and cost totals over the member file
//! - [`PopulationAnalytics`]: member counts combined with the financial impact model, with fixed
//!   benchmark values wherever the model is silent
//! - [`ProviderPerformance`]: the provider section of `population_analytics.json`

use crate::data_files::{read_json, read_optional_json};
use crate::members::MemberRecord;
use crate::{CareError, CareResult};
use care_types::MeasureType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Key used when a member has no evidence source or no measure type.
pub const MISSING_KEY: &str = "NONE";

/// Risk tiers counted by the analytics, matched exactly and case-sensitively.
const HIGH: &str = "HIGH";
const MEDIUM: &str = "MEDIUM";
const LOW: &str = "LOW";

fn count_risk(members: &[MemberRecord], level: &str) -> usize {
    members
        .iter()
        .filter(|m| m.risk_level() == Some(level))
        .count()
}

// ============================================================================
// Care management statistics
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    pub total_intervention_cost: f64,
    pub total_quality_bonus: f64,
    pub total_avoided_cost: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CareManagementStats {
    pub total_members: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub evidence_found: usize,
    pub evidence_sources: BTreeMap<String, usize>,
    pub measures: BTreeMap<String, usize>,
    pub cost_impact: CostTotals,
}

impl CareManagementStats {
    pub fn from_members(members: &[MemberRecord]) -> Self {
        let mut stats = Self {
            total_members: members.len(),
            high_risk: count_risk(members, HIGH),
            medium_risk: count_risk(members, MEDIUM),
            low_risk: count_risk(members, LOW),
            ..Self::default()
        };

        for member in members {
            if member.has_evidence() {
                stats.evidence_found += 1;
            }

            let source = member
                .evidence_source()
                .unwrap_or_else(|| MISSING_KEY.to_string());
            *stats.evidence_sources.entry(source).or_default() += 1;

            let measure = member.measure_type().unwrap_or(MISSING_KEY).to_string();
            *stats.measures.entry(measure).or_default() += 1;

            let costs = &mut stats.cost_impact;
            costs.total_intervention_cost += member.cost("intervention_cost");
            costs.total_quality_bonus += member.cost("quality_bonus_impact");
            costs.total_avoided_cost += member.cost("avoided_outreach_cost");
        }

        stats
    }
}

// ============================================================================
// Financial impact model
// ============================================================================

#[derive(Clone, Debug, Default, Deserialize)]
struct FinancialModelFile {
    #[serde(default)]
    hedis_ai_financial_model: FinancialModel,
}

/// The optional evidence-based financial model. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FinancialModel {
    pub measure_specific_impact: MeasureImpacts,
    pub dashboard_metrics: DashboardMetrics,
    pub financial_projections: FinancialProjections,
    pub metadata: ModelMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeasureImpacts {
    pub cervical_cancer_screening: MeasureImpact,
    pub colorectal_cancer_screening: MeasureImpact,
    pub well_child_visits: MeasureImpact,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeasureImpact {
    pub baseline_compliance: Option<f64>,
    pub target_compliance: Option<f64>,
    pub intervention_cost_per_member: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardMetrics {
    pub estimated_annual_roi: Option<f64>,
    pub quality_bonus_impact: Option<f64>,
    pub projected_compliance_improvement: Option<f64>,
    pub cost_per_member_per_month: Option<f64>,
    pub value_per_member_per_month: Option<f64>,
    pub net_value_pmpm: Option<f64>,
    pub avoided_outreach_percentage: Option<f64>,
    pub administrative_cost_reduction: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FinancialProjections {
    pub year_1: YearProjection,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct YearProjection {
    pub roi_percentage: Option<f64>,
    pub payback_months: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    pub data_sources: Option<Vec<String>>,
    pub last_updated: Option<String>,
}

impl FinancialModel {
    /// Load the model; an absent file yields the empty model.
    pub fn load(path: &Path) -> CareResult<Self> {
        let file: Option<FinancialModelFile> = read_optional_json(path)?;
        Ok(file.map(|f| f.hedis_ai_financial_model).unwrap_or_default())
    }
}

// ============================================================================
// Population analytics
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopulationAnalytics {
    pub population_overview: PopulationOverview,
    pub financial_impact: FinancialImpact,
    pub risk_stratification: RiskStratification,
    #[serde(flatten)]
    pub dashboard: DashboardSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopulationOverview {
    pub total_members: usize,
    pub measures: BTreeMap<MeasureType, MeasureOverview>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeasureOverview {
    pub name: String,
    pub eligible_members: usize,
    pub current_compliance: f64,
    pub projected_compliance: f64,
    pub quality_bonus_per_member: f64,
    pub intervention_cost_per_member: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialImpact {
    pub current_state: CurrentState,
    pub projected_with_ai: ProjectedWithAi,
    pub cost_comparison: CostComparison,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurrentState {
    pub total_quality_bonus: f64,
    pub traditional_success_rate: f64,
    pub total_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectedWithAi {
    pub net_roi: f64,
    pub roi_percentage: f64,
    pub quality_bonus_increase: f64,
    pub ai_success_rate: f64,
    pub payback_months: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostComparison {
    pub cost_reduction_percentage: f64,
    pub efficiency_multiplier: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskStratification {
    pub high_risk: RiskTier,
    pub medium_risk: RiskTier,
    pub low_risk: RiskTier,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskTier {
    pub count: usize,
    pub intervention_success_rate: f64,
    pub cost_per_intervention: f64,
}

/// Summary consumed by the care management dashboard (camelCase on the wire).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_members: usize,
    pub risk_distribution: RiskDistribution,
    pub evidence_found: usize,
    pub compliance_projections: ComplianceProjections,
    pub financial_impact: DashboardFinancials,
    pub methodology: Methodology,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComplianceProjections {
    pub baseline: f64,
    pub projected: f64,
    pub improvement: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFinancials {
    #[serde(rename = "totalROI")]
    pub total_roi: f64,
    pub cost_per_member_per_month: f64,
    pub value_per_member_per_month: f64,
    #[serde(rename = "netValuePMPM")]
    pub net_value_pmpm: f64,
    pub payback_months: f64,
    pub avoided_outreach_percentage: f64,
    pub administrative_savings: f64,
    pub quality_bonus_impact: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub data_sources: Vec<String>,
    pub confidence: String,
    pub last_updated: String,
}

const DEFAULT_DATA_SOURCES: [&str; 4] = [
    "CMS 2025 Medicare Advantage Rate Announcement",
    "CAQH 2024 Index Report",
    "NCQA Digital HEDIS Initiative",
    "KFF Medicare Advantage Quality Bonus Analysis",
];

/// Benchmark values for one measure when the model has none.
struct MeasureBenchmark {
    measure: MeasureType,
    baseline: f64,
    target: f64,
    quality_bonus_per_member: f64,
    intervention_cost: f64,
}

impl PopulationAnalytics {
    pub fn compute(members: &[MemberRecord], model: &FinancialModel) -> Self {
        let impacts = &model.measure_specific_impact;
        let metrics = &model.dashboard_metrics;
        let year_1 = &model.financial_projections.year_1;

        let benchmarks = [
            (
                &impacts.cervical_cancer_screening,
                MeasureBenchmark {
                    measure: MeasureType::Ccs,
                    baseline: 0.72,
                    target: 0.89,
                    quality_bonus_per_member: 65.0,
                    intervention_cost: 85.0,
                },
            ),
            (
                &impacts.colorectal_cancer_screening,
                MeasureBenchmark {
                    measure: MeasureType::Col,
                    baseline: 0.68,
                    target: 0.84,
                    quality_bonus_per_member: 75.0,
                    intervention_cost: 165.0,
                },
            ),
            (
                &impacts.well_child_visits,
                MeasureBenchmark {
                    measure: MeasureType::Wcv,
                    baseline: 0.75,
                    target: 0.92,
                    quality_bonus_per_member: 45.0,
                    intervention_cost: 65.0,
                },
            ),
        ];

        let measures = benchmarks
            .into_iter()
            .map(|(impact, bench)| {
                let overview = MeasureOverview {
                    name: bench.measure.display_name().to_string(),
                    eligible_members: members
                        .iter()
                        .filter(|m| m.measure_type() == Some(bench.measure.as_str()))
                        .count(),
                    current_compliance: impact.baseline_compliance.unwrap_or(bench.baseline),
                    projected_compliance: impact.target_compliance.unwrap_or(bench.target),
                    quality_bonus_per_member: bench.quality_bonus_per_member,
                    intervention_cost_per_member: impact
                        .intervention_cost_per_member
                        .unwrap_or(bench.intervention_cost),
                };
                (bench.measure, overview)
            })
            .collect();

        let high = count_risk(members, HIGH);
        let medium = count_risk(members, MEDIUM);
        let low = count_risk(members, LOW);

        let net_roi = metrics.estimated_annual_roi.unwrap_or(3_078_900.0);
        let quality_bonus_impact = metrics.quality_bonus_impact.unwrap_or(2_632_500.0);
        let payback_months = year_1.payback_months.unwrap_or(2.1);
        let ccs = &impacts.cervical_cancer_screening;

        Self {
            population_overview: PopulationOverview {
                total_members: members.len(),
                measures,
            },
            financial_impact: FinancialImpact {
                current_state: CurrentState {
                    total_quality_bonus: 1_850_000.0,
                    traditional_success_rate: 0.68,
                    total_cost: 450_000.0,
                },
                projected_with_ai: ProjectedWithAi {
                    net_roi,
                    roi_percentage: year_1.roi_percentage.unwrap_or(468.0) / 100.0,
                    quality_bonus_increase: quality_bonus_impact,
                    ai_success_rate: 0.89,
                    payback_months,
                },
                cost_comparison: CostComparison {
                    cost_reduction_percentage: 0.22,
                    efficiency_multiplier: 3.2,
                },
            },
            risk_stratification: RiskStratification {
                high_risk: RiskTier {
                    count: high,
                    intervention_success_rate: 0.85,
                    cost_per_intervention: 225.0,
                },
                medium_risk: RiskTier {
                    count: medium,
                    intervention_success_rate: 0.78,
                    cost_per_intervention: 125.0,
                },
                low_risk: RiskTier {
                    count: low,
                    intervention_success_rate: 0.92,
                    cost_per_intervention: 65.0,
                },
            },
            dashboard: DashboardSummary {
                total_members: members.len(),
                risk_distribution: RiskDistribution { high, medium, low },
                evidence_found: members.iter().filter(|m| m.has_evidence()).count(),
                compliance_projections: ComplianceProjections {
                    baseline: ccs.baseline_compliance.unwrap_or(0.72),
                    projected: ccs.target_compliance.unwrap_or(0.89),
                    improvement: metrics.projected_compliance_improvement.unwrap_or(0.168),
                },
                financial_impact: DashboardFinancials {
                    total_roi: net_roi,
                    cost_per_member_per_month: metrics.cost_per_member_per_month.unwrap_or(4.75),
                    value_per_member_per_month: metrics
                        .value_per_member_per_month
                        .unwrap_or(31.14),
                    net_value_pmpm: metrics.net_value_pmpm.unwrap_or(26.39),
                    payback_months,
                    avoided_outreach_percentage: metrics
                        .avoided_outreach_percentage
                        .unwrap_or(60.7),
                    administrative_savings: metrics
                        .administrative_cost_reduction
                        .unwrap_or(700_000.0),
                    quality_bonus_impact,
                },
                methodology: Methodology {
                    data_sources: model.metadata.data_sources.clone().unwrap_or_else(|| {
                        DEFAULT_DATA_SOURCES.iter().map(|s| s.to_string()).collect()
                    }),
                    confidence: "High - Based on validated industry benchmarks".to_string(),
                    last_updated: model
                        .metadata
                        .last_updated
                        .clone()
                        .unwrap_or_else(|| "2024-12-15".to_string()),
                },
            },
        }
    }
}

// ============================================================================
// Provider performance
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderPerformance {
    pub network_overview: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_sources: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_performers: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_opportunities: Option<Value>,
}

/// Extract the provider section from `population_analytics.json`.
pub fn provider_performance(path: &Path) -> CareResult<ProviderPerformance> {
    let analytics: Value = read_json(path)?;

    let network = analytics
        .get("provider_network_analysis")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or(CareError::MissingSection("provider_network_analysis"))?;

    Ok(ProviderPerformance {
        top_performers: network.get("top_performing_providers").cloned(),
        improvement_opportunities: network.get("improvement_opportunities").cloned(),
        evidence_sources: analytics.get("evidence_sources").cloned(),
        network_overview: network,
    })
}
