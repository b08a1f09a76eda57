// Tracelink - change-propagation and traceability engine for V-model
// specification document chains.
//
// Documents reference each other through typed identifiers (REQ-001, F-012,
// SCR-SAL-001). This crate keeps that web consistent as documents evolve:
// it extracts and classifies identifiers, plans how a change ripples through
// the fixed precedence graph, tracks change requests through their lifecycle,
// surfaces contention between parallel changes, and scores the overall
// health of the traceability web.

pub mod analysis;
pub mod chain;
pub mod error;
pub mod models;
pub mod parser;
pub mod scoring;
pub mod state;

pub use error::ChainError;

// Re-export commonly used types
pub use chain::{compute_propagation_order, PropagationOptions};
pub use models::{ChangeRequest, CrStatus, DocType, PropagationStep, StepDirection, StepStatus};
pub use state::CrStore;
