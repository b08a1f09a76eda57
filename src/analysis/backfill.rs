//! Upstream backfill suggestions.
//!
//! Diffs two revisions of a document for newly introduced identifiers whose
//! defining document does not mention them yet. Prefixes without an owning
//! document and owners without supplied text are skipped, not errors.

use crate::chain::graph::owners_of;
use crate::models::DocType;
use crate::parser::ids::extract_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// What the upstream document needs done for the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackfillAction {
    Add,
    Update,
}

/// One identifier that should be added upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillSuggestion {
    /// The newly introduced identifier, e.g. `F-012`
    pub id: String,
    /// Upstream document that should define it
    pub target_doc: DocType,
    pub action: BackfillAction,
    pub reason: String,
}

/// Compare old and new revisions of `origin_doc`, returning one suggestion per
/// `(id, target_doc)` pair for identifiers that are new in this revision and
/// absent from the upstream document that owns their prefix.
///
/// Identifiers owned by the origin document itself need no backfill and are
/// skipped. The result is sorted by id.
pub fn generate_backfill_suggestions(
    origin_doc: DocType,
    old_text: &str,
    new_text: &str,
    upstream_docs: &BTreeMap<DocType, String>,
) -> Vec<BackfillSuggestion> {
    let old_ids = extract_all(old_text);
    let new_ids = extract_all(new_text);
    let mut suggestions = Vec::new();
    let mut seen: HashSet<(String, DocType)> = HashSet::new();

    for id in &new_ids {
        let prefix = id.split('-').next().unwrap_or_default();
        let owners = owners_of(prefix);
        if owners.is_empty() || owners.contains(&origin_doc) {
            continue;
        }

        for &target in owners {
            let Some(upstream_text) = upstream_docs.get(&target) else {
                continue;
            };
            let is_new = !old_ids.contains(id);
            if is_new
                && !upstream_text.contains(id.as_str())
                && seen.insert((id.clone(), target))
            {
                suggestions.push(BackfillSuggestion {
                    id: id.clone(),
                    target_doc: target,
                    action: BackfillAction::Add,
                    reason: format!(
                        "New {} referenced in {} but not defined in {}",
                        id,
                        origin_doc.name(),
                        target.name()
                    ),
                });
            }
        }
    }

    suggestions.sort_by(|a, b| a.id.cmp(&b.id));
    suggestions
}
