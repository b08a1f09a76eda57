//! Structural health scoring from validation results.
//!
//! Score per document: `max(0, 100 - errors*10 - warnings*3)`.

use crate::models::DocType;
use serde::{Deserialize, Serialize};

/// Severity of a single validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

/// One issue reported by an external validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issues without an explicit severity are counted as errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<IssueSeverity>,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Some(IssueSeverity::Error),
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Some(IssueSeverity::Warning),
            message: message.into(),
        }
    }
}

/// Validation outcome for one document, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocValidation {
    pub doc_type: DocType,
    pub issues: Vec<ValidationIssue>,
}

/// Health of a single document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocHealth {
    pub doc_type: DocType,
    pub score: u32,
    /// Up to three error messages, in reported order
    pub top_issues: Vec<String>,
}

/// Health across all validated documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthScore {
    /// Rounded arithmetic mean of per-document scores, 0 when empty
    pub overall: u32,
    pub per_doc: Vec<DocHealth>,
}

fn score_document(issues: &[ValidationIssue]) -> (u32, Vec<String>) {
    let mut errors: i64 = 0;
    let mut warnings: i64 = 0;
    let mut error_messages = Vec::new();

    for issue in issues {
        match issue.severity {
            // Unspecified severity counts as an error
            Some(IssueSeverity::Error) | None => {
                errors += 1;
                error_messages.push(issue.message.clone());
            }
            Some(IssueSeverity::Warning) => warnings += 1,
            Some(IssueSeverity::Info) => {}
        }
    }

    let score = (100 - errors * 10 - warnings * 3).max(0) as u32;
    error_messages.truncate(3);
    (score, error_messages)
}

/// Compute per-document and overall health scores.
pub fn compute_health_score(results: &[DocValidation]) -> HealthScore {
    if results.is_empty() {
        return HealthScore {
            overall: 0,
            per_doc: Vec::new(),
        };
    }

    let per_doc: Vec<DocHealth> = results
        .iter()
        .map(|result| {
            let (score, top_issues) = score_document(&result.issues);
            DocHealth {
                doc_type: result.doc_type,
                score,
                top_issues,
            }
        })
        .collect();

    let overall = (per_doc.iter().map(|d| d.score as f64).sum::<f64>() / per_doc.len() as f64)
        .round() as u32;

    HealthScore { overall, per_doc }
}
