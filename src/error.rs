use crate::models::{CrStatus, StepStatus};
use thiserror::Error;

/// Errors surfaced at the engine boundary.
///
/// Internal "not found" conditions (empty traversals, unresolvable prefixes,
/// missing upstream documents) are soft failures and never reach this type.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The caller named a document type outside the fixed enumeration.
    #[error("unknown document type: {0}")]
    UnknownDocType(String),

    /// The caller supplied a token that does not follow the identifier grammar.
    #[error("malformed identifier pattern: {0}")]
    MalformedIdPattern(String),

    /// Requested state change is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: CrStatus, to: CrStatus },

    /// Propagation steps cannot be recomputed once propagation has begun.
    #[error("propagation steps are frozen in status {status}")]
    StepsFrozen { status: CrStatus },

    /// The propagation cursor has already passed the last step.
    #[error("no pending propagation step (index {index} of {total})")]
    NoPendingStep { index: usize, total: usize },

    /// No step is awaiting confirmation.
    #[error("no instructed propagation step to resolve")]
    NoInstructedStep,

    /// Steps can only be resolved to `done` or `skipped`.
    #[error("invalid step outcome: {0}")]
    InvalidStepOutcome(StepStatus),

    /// Change request identifier does not match `CR-YYMMDD-NNN`.
    #[error("invalid change request id: {0}")]
    InvalidCrId(String),

    /// A persisted change request carries more steps than the chain allows.
    #[error("propagation step count {count} exceeds the maximum of {max}")]
    StepLimitExceeded { count: usize, max: usize },
}
