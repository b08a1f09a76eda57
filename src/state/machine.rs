//! Change request state machine and propagation step lifecycle.
//!
//! Every function here mutates a caller-owned [`ChangeRequest`] and takes the
//! current date as a parameter; the engine never touches the clock or disk.

use crate::analysis::conflict::{detect_conflicts, ConflictResult};
use crate::chain::propagation::{compute_propagation_order_with, PropagationOptions};
use crate::error::ChainError;
use crate::models::{
    ChangeRequest, CrHistoryEntry, CrStatus, DocType, PropagationStep, StepDirection, StepStatus,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use tracing::debug;

/// Upper bound on stored propagation steps. The chain itself can never
/// produce more; a persisted request above this is corrupted.
pub const MAX_PROPAGATION_STEPS: usize = 20;

fn cr_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CR-\d{6}-\d{3}$").unwrap())
}

/// Statuses reachable from `from` in a single transition.
pub fn allowed_transitions(from: CrStatus) -> &'static [CrStatus] {
    match from {
        CrStatus::Initiated => &[CrStatus::Analyzing, CrStatus::Cancelled],
        CrStatus::Analyzing => &[CrStatus::ImpactAnalyzed, CrStatus::Cancelled],
        CrStatus::ImpactAnalyzed => &[CrStatus::Approved, CrStatus::Cancelled],
        CrStatus::Approved => &[CrStatus::Propagating, CrStatus::Cancelled],
        CrStatus::Propagating => &[CrStatus::Validated, CrStatus::Approved, CrStatus::Cancelled],
        CrStatus::Validated => &[CrStatus::Completed, CrStatus::Cancelled],
        CrStatus::Completed | CrStatus::Cancelled => &[],
    }
}

/// Whether `from -> to` is in the transition table.
pub fn validate_transition(from: CrStatus, to: CrStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Apply a transition, appending a history entry.
pub fn transition(
    cr: &mut ChangeRequest,
    to: CrStatus,
    reason: Option<String>,
    now: &str,
) -> Result<(), ChainError> {
    if !validate_transition(cr.status, to) {
        return Err(ChainError::InvalidTransition {
            from: cr.status,
            to,
        });
    }
    debug!(id = %cr.id, from = cr.status.name(), to = to.name(), "change request transition");
    cr.status = to;
    cr.updated = now.to_string();
    cr.history.push(CrHistoryEntry {
        status: to,
        entered: now.to_string(),
        reason,
    });
    Ok(())
}

/// Transition into APPROVED, running conflict detection against the pool.
///
/// Detected conflicts are recorded on the request as warnings and returned
/// to the caller. They are advisory: a non-empty result never blocks the
/// transition.
pub fn approve(
    cr: &mut ChangeRequest,
    pool: &[ChangeRequest],
    now: &str,
) -> Result<Vec<ConflictResult>, ChainError> {
    let conflicts = detect_conflicts(cr, pool);
    transition(cr, CrStatus::Approved, Some("Approved for propagation".to_string()), now)?;
    if !conflicts.is_empty() {
        cr.conflict_warnings = conflicts
            .iter()
            .map(|c| {
                format!(
                    "{} overlap with {}: {}",
                    c.overlap_type.name(),
                    c.cr_id,
                    c.overlapping.join(", ")
                )
            })
            .collect();
    }
    Ok(conflicts)
}

/// Compute and store the propagation plan for the request's origin document.
///
/// Replanning is allowed up to APPROVED; once propagation begins the step
/// list is frozen.
pub fn plan_propagation<'a>(
    cr: &'a mut ChangeRequest,
    options: &PropagationOptions,
) -> Result<&'a [PropagationStep], ChainError> {
    if matches!(
        cr.status,
        CrStatus::Propagating | CrStatus::Validated | CrStatus::Completed | CrStatus::Cancelled
    ) {
        return Err(ChainError::StepsFrozen { status: cr.status });
    }
    cr.propagation_steps = compute_propagation_order_with(cr.origin_doc, options);
    cr.propagation_index = 0;
    Ok(&cr.propagation_steps)
}

/// Instruction issued to the operator for one propagation step.
#[derive(Debug, Clone, Serialize)]
pub struct StepInstruction {
    /// 1-based position in the plan
    pub step: usize,
    pub total: usize,
    pub doc_type: DocType,
    pub direction: StepDirection,
    pub instruction: String,
    pub all_steps_complete: bool,
}

/// Mark the step under the cursor as instructed and advance the cursor.
///
/// The first call on an APPROVED request implicitly transitions it to
/// PROPAGATING, freezing the plan. For upstream steps, `target_content` (the
/// current text of the step's document) is fingerprinted so the later
/// confirmation can tell whether the document actually changed.
pub fn instruct_next_step(
    cr: &mut ChangeRequest,
    note: Option<String>,
    target_content: Option<&str>,
    now: &str,
) -> Result<StepInstruction, ChainError> {
    match cr.status {
        CrStatus::Approved => {
            transition(cr, CrStatus::Propagating, Some("Starting propagation".to_string()), now)?;
        }
        CrStatus::Propagating => {}
        _ => {
            return Err(ChainError::InvalidTransition {
                from: cr.status,
                to: CrStatus::Propagating,
            })
        }
    }

    let total = cr.propagation_steps.len();
    let idx = cr.propagation_index;
    if idx >= total {
        return Err(ChainError::NoPendingStep { index: idx, total });
    }

    let step = &mut cr.propagation_steps[idx];
    step.status = StepStatus::Instructed;
    step.note = note;
    let doc_type = step.doc_type;
    let direction = step.direction;
    if direction == StepDirection::Upstream {
        if let Some(content) = target_content {
            step.content_hash = Some(content_fingerprint(content));
        }
    }

    let instruction = match direction {
        StepDirection::Upstream => format!(
            "UPSTREAM SUGGESTION: review and update {} to cover the identifiers touched by this change. This is a non-destructive suggestion.",
            doc_type.name()
        ),
        StepDirection::Downstream => format!(
            "DOWNSTREAM CASCADE: regenerate {} to reflect the upstream changes.",
            doc_type.name()
        ),
    };

    cr.propagation_index = idx + 1;
    cr.updated = now.to_string();

    Ok(StepInstruction {
        step: idx + 1,
        total,
        doc_type,
        direction,
        instruction,
        all_steps_complete: idx + 1 >= total,
    })
}

/// Outcome of resolving an instructed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResolution {
    /// 1-based position in the plan
    pub step: usize,
    pub doc_type: DocType,
    pub direction: StepDirection,
    /// Steps still pending after this resolution
    pub remaining_pending: usize,
    /// Whether the target document changed since instruction time; known
    /// only when a fingerprint was recorded and current content is supplied
    pub target_changed: Option<bool>,
}

/// Resolve the earliest instructed step to `done` or `skipped`.
///
/// Earlier steps are never rewritten; only the status, note and the change
/// verdict of the instructed step itself are touched.
pub fn resolve_instructed_step(
    cr: &mut ChangeRequest,
    outcome: StepStatus,
    note: Option<String>,
    current_target_content: Option<&str>,
    now: &str,
) -> Result<StepResolution, ChainError> {
    if !outcome.is_resolved() {
        return Err(ChainError::InvalidStepOutcome(outcome));
    }
    let Some(idx) = cr
        .propagation_steps
        .iter()
        .position(|s| s.status == StepStatus::Instructed)
    else {
        return Err(ChainError::NoInstructedStep);
    };

    let step = &mut cr.propagation_steps[idx];
    step.status = outcome;
    if note.is_some() {
        step.note = note;
    }
    let target_changed = match (step.content_hash.as_deref(), current_target_content) {
        (Some(recorded), Some(current)) => Some(content_fingerprint(current) != recorded),
        _ => None,
    };
    let doc_type = step.doc_type;
    let direction = step.direction;

    cr.updated = now.to_string();
    let remaining_pending = cr
        .propagation_steps
        .iter()
        .filter(|s| s.status == StepStatus::Pending)
        .count();

    Ok(StepResolution {
        step: idx + 1,
        doc_type,
        direction,
        remaining_pending,
        target_changed,
    })
}

/// Predicate for the VALIDATED to COMPLETED gate: every step is done or
/// skipped. The engine exposes this for callers; it does not enforce it.
pub fn all_steps_resolved(cr: &ChangeRequest) -> bool {
    cr.propagation_steps.iter().all(|s| s.status.is_resolved())
}

/// Whether an id matches the `CR-YYMMDD-NNN` format.
pub fn is_valid_cr_id(id: &str) -> bool {
    cr_id_re().is_match(id)
}

/// Next `CR-YYMMDD-NNN` id for the given date, scanning existing ids for the
/// highest sequence number under the same date prefix.
pub fn generate_cr_id(date: NaiveDate, existing: &[String]) -> String {
    let date_prefix = date.format("%y%m%d").to_string();
    let prefix = format!("CR-{date_prefix}-");
    let mut max_seq: u32 = 0;
    for id in existing {
        if let Some(rest) = id.strip_prefix(&prefix) {
            if rest.len() == 3 {
                if let Ok(seq) = rest.parse::<u32>() {
                    max_seq = max_seq.max(seq);
                }
            }
        }
    }
    format!("CR-{}-{:03}", date_prefix, max_seq + 1)
}

/// Short SHA-256 fingerprint of document content, as stamped on upstream
/// propagation steps.
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}
