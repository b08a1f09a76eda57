use super::DocType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrStatus {
    /// Created, awaiting impact analysis
    Initiated,
    /// Impact analysis in progress
    Analyzing,
    /// Impact analysis complete, awaiting approval
    ImpactAnalyzed,
    /// Approved for propagation
    Approved,
    /// Propagation steps being executed
    Propagating,
    /// All steps executed, awaiting completion
    Validated,
    /// Terminal: change fully propagated
    Completed,
    /// Terminal: abandoned
    Cancelled,
}

impl CrStatus {
    pub fn name(&self) -> &'static str {
        match self {
            CrStatus::Initiated => "INITIATED",
            CrStatus::Analyzing => "ANALYZING",
            CrStatus::ImpactAnalyzed => "IMPACT_ANALYZED",
            CrStatus::Approved => "APPROVED",
            CrStatus::Propagating => "PROPAGATING",
            CrStatus::Validated => "VALIDATED",
            CrStatus::Completed => "COMPLETED",
            CrStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CrStatus::Completed | CrStatus::Cancelled)
    }

    /// Active requests are the ones committed to propagation; only these
    /// participate in conflict detection.
    pub fn is_active(&self) -> bool {
        matches!(self, CrStatus::Approved | CrStatus::Propagating)
    }
}

impl fmt::Display for CrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a propagation step relative to the change origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    Upstream,
    Downstream,
}

impl StepDirection {
    pub fn name(&self) -> &'static str {
        match self {
            StepDirection::Upstream => "upstream",
            StepDirection::Downstream => "downstream",
        }
    }
}

impl fmt::Display for StepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Execution status of a single propagation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not yet reached by the cursor
    Pending,
    /// Operator instruction issued, awaiting confirmation
    Instructed,
    /// Confirmed as carried out
    Done,
    /// Deliberately not carried out
    Skipped,
}

impl StepStatus {
    pub fn name(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Instructed => "instructed",
            StepStatus::Done => "done",
            StepStatus::Skipped => "skipped",
        }
    }

    /// Done and skipped are the two end states of a step.
    pub fn is_resolved(&self) -> bool {
        matches!(self, StepStatus::Done | StepStatus::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One document that must be revisited as a consequence of a change.
///
/// Steps are created in order at planning time and never reordered. The
/// optional fields are populated as the operator works through the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationStep {
    pub doc_type: DocType,
    pub direction: StepDirection,
    pub status: StepStatus,

    /// Operator note attached when the step is instructed or resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Fingerprint of the target document at instruction time, used to tell
    /// whether the document actually changed before the step was confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl PropagationStep {
    /// A freshly planned step.
    pub fn pending(doc_type: DocType, direction: StepDirection) -> Self {
        Self {
            doc_type,
            direction,
            status: StepStatus::Pending,
            note: None,
            content_hash: None,
        }
    }
}

/// One entry in a change request's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrHistoryEntry {
    pub status: CrStatus,
    /// ISO date the status was entered
    pub entered: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A tracked unit of change with a lifecycle, a set of changed identifiers,
/// and a propagation plan.
///
/// The engine operates on transient copies; storage is owned by the caller
/// (see [`crate::state::CrStore`] for the file-backed implementation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Identifier in `CR-YYMMDD-NNN` format
    pub id: String,
    pub status: CrStatus,
    /// Document type where the change originated
    pub origin_doc: DocType,
    pub description: String,
    /// Identifiers touched by the change, e.g. `["REQ-003", "F-005"]`
    #[serde(default)]
    pub changed_ids: Vec<String>,
    /// Populated after impact analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_summary: Option<String>,
    #[serde(default)]
    pub propagation_steps: Vec<PropagationStep>,
    /// Cursor into `propagation_steps` (0-based)
    #[serde(default)]
    pub propagation_index: usize,
    /// Advisory warnings recorded at the APPROVED transition
    #[serde(default)]
    pub conflict_warnings: Vec<String>,
    /// ISO date of creation
    pub created: String,
    /// ISO date of last mutation
    pub updated: String,
    #[serde(default)]
    pub history: Vec<CrHistoryEntry>,
}

impl ChangeRequest {
    /// Create a request in `INITIATED` with a seeded history entry.
    ///
    /// `now` is an ISO date supplied by the caller; the engine never reads
    /// the clock itself.
    pub fn new(
        id: impl Into<String>,
        origin_doc: DocType,
        description: impl Into<String>,
        changed_ids: Vec<String>,
        now: &str,
    ) -> Self {
        Self {
            id: id.into(),
            status: CrStatus::Initiated,
            origin_doc,
            description: description.into(),
            changed_ids,
            impact_summary: None,
            propagation_steps: Vec::new(),
            propagation_index: 0,
            conflict_warnings: Vec::new(),
            created: now.to_string(),
            updated: now.to_string(),
            history: vec![CrHistoryEntry {
                status: CrStatus::Initiated,
                entered: now.to_string(),
                reason: Some("Initial creation".to_string()),
            }],
        }
    }

    /// Document types named by the propagation plan, in step order.
    pub fn propagation_docs(&self) -> Vec<DocType> {
        self.propagation_steps.iter().map(|s| s.doc_type).collect()
    }

    /// Step under the cursor, if any remain.
    pub fn current_step(&self) -> Option<&PropagationStep> {
        self.propagation_steps.get(self.propagation_index)
    }
}
