//! Analysis over document bodies: impact, conflicts, backfill, cross-refs.

pub mod backfill;
pub mod conflict;
pub mod crossref;
pub mod impact;

pub use backfill::{generate_backfill_suggestions, BackfillAction, BackfillSuggestion};
pub use conflict::{detect_conflicts, ConflictResult, OverlapKind};
pub use crossref::{
    analyze_graph, build_id_graph, build_traceability_matrix, ChainLinkReport, ChainRefReport,
    IdGraph, IdGraphNode, MissingId, OrphanedId, TraceabilityEntry,
};
pub use impact::{
    build_dependency_mermaid, build_impact_report, find_affected_sections, ImpactEntry,
    ImpactReport, ImpactSeverity,
};
