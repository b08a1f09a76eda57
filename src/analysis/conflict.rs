//! Parallel change-request conflict detection.
//!
//! Only requests already committed to propagation (APPROVED or PROPAGATING)
//! count as contention risks; everything else in the pool is ignored.

use crate::models::ChangeRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which dimension two change requests overlap on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    ChangedIds,
    PropagationDocs,
}

impl OverlapKind {
    pub fn name(&self) -> &'static str {
        match self {
            OverlapKind::ChangedIds => "changed_ids",
            OverlapKind::PropagationDocs => "propagation_docs",
        }
    }
}

/// One detected overlap between the candidate and another active request.
///
/// A single other request can contribute up to two results, one per overlap
/// kind. Results are advisory; the engine never blocks on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictResult {
    /// The conflicting change request
    pub cr_id: String,
    pub overlap_type: OverlapKind,
    /// The identifiers or document type names that overlap
    pub overlapping: Vec<String>,
}

fn intersect(a: &[String], b: &[String]) -> Vec<String> {
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.iter().filter(|x| set_b.contains(x.as_str())).cloned().collect()
}

/// Compare a candidate against all currently active requests in the pool.
pub fn detect_conflicts(candidate: &ChangeRequest, pool: &[ChangeRequest]) -> Vec<ConflictResult> {
    let mut results = Vec::new();

    for other in pool {
        if !other.status.is_active() || other.id == candidate.id {
            continue;
        }

        let id_overlap = intersect(&candidate.changed_ids, &other.changed_ids);
        if !id_overlap.is_empty() {
            results.push(ConflictResult {
                cr_id: other.id.clone(),
                overlap_type: OverlapKind::ChangedIds,
                overlapping: id_overlap,
            });
        }

        let candidate_docs: Vec<String> = candidate
            .propagation_steps
            .iter()
            .map(|s| s.doc_type.name().to_string())
            .collect();
        let other_docs: Vec<String> = other
            .propagation_steps
            .iter()
            .map(|s| s.doc_type.name().to_string())
            .collect();
        let doc_overlap = intersect(&candidate_docs, &other_docs);
        if !doc_overlap.is_empty() {
            results.push(ConflictResult {
                cr_id: other.id.clone(),
                overlap_type: OverlapKind::PropagationDocs,
                overlapping: doc_overlap,
            });
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::compute_propagation_order;
    use crate::models::{CrStatus, DocType};

    fn request(id: &str, status: CrStatus, origin: DocType, changed: &[&str]) -> ChangeRequest {
        let mut cr = ChangeRequest::new(
            id,
            origin,
            "test request",
            changed.iter().map(|s| s.to_string()).collect(),
            "2024-01-10",
        );
        cr.status = status;
        cr.propagation_steps = compute_propagation_order(origin);
        cr
    }

    #[test]
    fn test_inactive_pool_produces_no_conflicts() {
        let candidate = request("CR-240110-001", CrStatus::ImpactAnalyzed, DocType::Requirements, &["REQ-001"]);
        let pool = vec![
            request("CR-240110-002", CrStatus::Initiated, DocType::Requirements, &["REQ-001"]),
            request("CR-240110-003", CrStatus::Completed, DocType::Requirements, &["REQ-001"]),
            request("CR-240110-004", CrStatus::Cancelled, DocType::Requirements, &["REQ-001"]),
            request("CR-240110-005", CrStatus::Analyzing, DocType::Requirements, &["REQ-001"]),
            request("CR-240110-006", CrStatus::ImpactAnalyzed, DocType::Requirements, &["REQ-001"]),
        ];
        assert!(detect_conflicts(&candidate, &pool).is_empty());
    }

    #[test]
    fn test_candidate_never_conflicts_with_itself() {
        let candidate = request("CR-240110-001", CrStatus::Approved, DocType::Requirements, &["REQ-001"]);
        let pool = vec![candidate.clone()];
        assert!(detect_conflicts(&candidate, &pool).is_empty());
    }

    #[test]
    fn test_changed_id_overlap_reported() {
        let candidate = request("CR-240110-001", CrStatus::ImpactAnalyzed, DocType::UtSpec, &["REQ-001", "F-002"]);
        let pool = vec![request("CR-240110-002", CrStatus::Approved, DocType::UatSpec, &["F-002", "F-003"])];
        let conflicts = detect_conflicts(&candidate, &pool);
        let id_conflict = conflicts
            .iter()
            .find(|c| c.overlap_type == OverlapKind::ChangedIds)
            .unwrap();
        assert_eq!(id_conflict.cr_id, "CR-240110-002");
        assert_eq!(id_conflict.overlapping, vec!["F-002"]);
    }

    #[test]
    fn test_one_request_can_contribute_both_kinds() {
        let candidate = request("CR-240110-001", CrStatus::ImpactAnalyzed, DocType::Requirements, &["REQ-001"]);
        let pool = vec![request("CR-240110-002", CrStatus::Propagating, DocType::BasicDesign, &["REQ-001"])];
        let conflicts = detect_conflicts(&candidate, &pool);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().any(|c| c.overlap_type == OverlapKind::ChangedIds));
        let docs = conflicts
            .iter()
            .find(|c| c.overlap_type == OverlapKind::PropagationDocs)
            .unwrap();
        assert!(docs.overlapping.contains(&"detail-design".to_string()));
    }
}
