//! Derived scoring metrics: staleness, coverage, health, risk.
//!
//! All pure functions over data supplied by the caller; reading project
//! configuration and running validators happens outside this crate.

pub mod coverage;
pub mod health;
pub mod risk;
pub mod staleness;

pub use coverage::{compute_coverage_metrics, CoverageMetrics, DocTypeCoverage};
pub use health::{compute_health_score, DocValidation, HealthScore, IssueSeverity, ValidationIssue};
pub use risk::{compute_risk_score, RiskBreakdown, RiskGrade, RiskScore};
pub use staleness::{compute_staleness, ChainEntry, DocStatus, StalenessData, StalenessWarning};
