pub mod change_request;
pub mod document;

pub use change_request::{
    ChangeRequest, CrHistoryEntry, CrStatus, PropagationStep, StepDirection, StepStatus,
};
pub use document::{DocType, Phase, ALL_DOC_TYPES, CHAIN_ORDER};
