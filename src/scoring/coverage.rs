//! Coverage metrics over the traceability matrix.

use crate::analysis::crossref::TraceabilityEntry;
use crate::models::DocType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document types that count as design coverage for a requirement.
pub const DESIGN_DOC_TYPES: &[DocType] = &[
    DocType::BasicDesign,
    DocType::DetailDesign,
    DocType::SecurityDesign,
];

/// Document types that count as test coverage for a requirement.
pub const TEST_DOC_TYPES: &[DocType] = &[
    DocType::UtSpec,
    DocType::ItSpec,
    DocType::StSpec,
    DocType::UatSpec,
    DocType::TestPlan,
];

/// Per-document-type coverage tally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocTypeCoverage {
    pub total: usize,
    pub traced: usize,
    /// Percentage, rounded to the nearest integer
    pub coverage: u32,
}

/// Coverage summary across the whole matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageMetrics {
    /// Percent of all entries with at least one downstream reference
    pub overall: u32,
    pub by_doc_type: BTreeMap<DocType, DocTypeCoverage>,
    /// Percent of requirements traced into a design document
    pub req_to_design: u32,
    /// Percent of requirements traced into a test document
    pub req_to_test: u32,
    /// Percent of requirements traced into both
    pub full_trace: u32,
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

/// Compute coverage metrics from the traceability matrix.
///
/// All metrics are zero for an empty matrix.
pub fn compute_coverage_metrics(matrix: &[TraceabilityEntry]) -> CoverageMetrics {
    if matrix.is_empty() {
        return CoverageMetrics {
            overall: 0,
            by_doc_type: BTreeMap::new(),
            req_to_design: 0,
            req_to_test: 0,
            full_trace: 0,
        };
    }

    let mut by_doc_type: BTreeMap<DocType, DocTypeCoverage> = BTreeMap::new();
    for entry in matrix {
        let group = by_doc_type.entry(entry.doc_type).or_default();
        group.total += 1;
        if !entry.downstream_refs.is_empty() {
            group.traced += 1;
        }
    }
    for group in by_doc_type.values_mut() {
        group.coverage = percent(group.traced, group.total);
    }

    let traced_entries = matrix.iter().filter(|e| !e.downstream_refs.is_empty()).count();
    let overall = percent(traced_entries, matrix.len());

    let req_entries: Vec<&TraceabilityEntry> = matrix
        .iter()
        .filter(|e| e.doc_type == DocType::Requirements)
        .collect();
    let req_total = req_entries.len();

    let has_design = |e: &TraceabilityEntry| {
        e.downstream_refs.iter().any(|r| DESIGN_DOC_TYPES.contains(r))
    };
    let has_test =
        |e: &TraceabilityEntry| e.downstream_refs.iter().any(|r| TEST_DOC_TYPES.contains(r));

    let req_to_design = percent(
        req_entries.iter().filter(|e| has_design(e)).count(),
        req_total,
    );
    let req_to_test = percent(req_entries.iter().filter(|e| has_test(e)).count(), req_total);
    let full_trace = percent(
        req_entries.iter().filter(|e| has_design(e) && has_test(e)).count(),
        req_total,
    );

    CoverageMetrics {
        overall,
        by_doc_type,
        req_to_design,
        req_to_test,
        full_trace,
    }
}
