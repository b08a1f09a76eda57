//! Weighted project risk score from five quality dimensions.

use serde::{Deserialize, Serialize};

/// Traffic-light grade derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskGrade {
    Green,
    Yellow,
    Red,
}

impl RiskGrade {
    pub fn name(&self) -> &'static str {
        match self {
            RiskGrade::Green => "green",
            RiskGrade::Yellow => "yellow",
            RiskGrade::Red => "red",
        }
    }
}

/// The five input dimensions, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub trace_completeness: f64,
    pub nfr_coverage: f64,
    pub test_coverage: f64,
    pub freshness: f64,
    pub structural_health: f64,
}

/// Overall risk with its grade and the inputs that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    pub overall: u32,
    pub grade: RiskGrade,
    pub breakdown: RiskBreakdown,
}

/// Weighted risk: `0.30*trace + 0.20*nfr + 0.20*test + 0.15*fresh +
/// 0.15*health`, rounded. Grade: green at 80+, yellow at 60+, red below.
pub fn compute_risk_score(breakdown: RiskBreakdown) -> RiskScore {
    let overall = (0.30 * breakdown.trace_completeness
        + 0.20 * breakdown.nfr_coverage
        + 0.20 * breakdown.test_coverage
        + 0.15 * breakdown.freshness
        + 0.15 * breakdown.structural_health)
        .round() as u32;

    let grade = if overall >= 80 {
        RiskGrade::Green
    } else if overall >= 60 {
        RiskGrade::Yellow
    } else {
        RiskGrade::Red
    };

    RiskScore {
        overall,
        grade,
        breakdown,
    }
}
