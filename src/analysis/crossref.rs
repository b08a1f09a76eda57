//! Cross-reference linker: identifier graph across the document chain,
//! orphaned/missing detection per chain edge, and the traceability matrix.

use crate::chain::graph::{owners_of, CHAIN_EDGES};
use crate::models::{DocType, CHAIN_ORDER};
use crate::parser::ids::{extract_all, extract_identifiers, OTHER_BUCKET};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifiers present in one document.
///
/// `defined` holds every identifier in the document, custom prefixes
/// included; `referenced` is restricted to known-prefix identifiers. Which
/// of the `defined` ids a document truly originates is decided by prefix
/// ownership, not by this structure.
#[derive(Debug, Clone)]
pub struct IdGraphNode {
    pub defined: BTreeSet<String>,
    pub referenced: BTreeSet<String>,
}

pub type IdGraph = BTreeMap<DocType, IdGraphNode>;

/// One identifier an upstream document defines with its downstream audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceabilityEntry {
    pub id: String,
    pub doc_type: DocType,
    pub downstream_refs: Vec<DocType>,
}

/// Identifier defined upstream but never referenced by its downstream pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanedId {
    pub id: String,
    pub defined_in: DocType,
    pub expected_in: DocType,
}

/// Identifier referenced downstream but not defined by its upstream owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingId {
    pub id: String,
    pub referenced_in: DocType,
    pub expected_from: DocType,
}

/// Findings for a single chain edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainLinkReport {
    pub upstream: DocType,
    pub downstream: DocType,
    pub orphaned_ids: Vec<String>,
    pub missing_ids: Vec<String>,
}

/// Full cross-reference analysis over the supplied documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRefReport {
    pub links: Vec<ChainLinkReport>,
    pub orphaned_ids: Vec<OrphanedId>,
    pub missing_ids: Vec<MissingId>,
    pub traceability_matrix: Vec<TraceabilityEntry>,
    pub suggestions: Vec<String>,
}

fn known_ids(content: &str) -> BTreeSet<String> {
    extract_identifiers(content)
        .into_iter()
        .filter(|(prefix, _)| prefix != OTHER_BUCKET)
        .flat_map(|(_, ids)| ids)
        .collect()
}

/// Collect defined and referenced identifiers for each document.
pub fn build_id_graph(docs: &BTreeMap<DocType, String>) -> IdGraph {
    docs.iter()
        .map(|(doc_type, content)| {
            let referenced = known_ids(content);
            let defined = extract_all(content);
            (*doc_type, IdGraphNode { defined, referenced })
        })
        .collect()
}

/// Build the traceability matrix: for every identifier owned by the document
/// it appears in, the list of later chain documents that reference it.
///
/// Supplementary documents sit outside the linear chain order and contribute
/// no matrix rows.
pub fn build_traceability_matrix(docs: &BTreeMap<DocType, String>) -> Vec<TraceabilityEntry> {
    let mut matrix = Vec::new();

    for (doc_type, content) in docs {
        let Some(origin_idx) = CHAIN_ORDER.iter().position(|d| d == doc_type) else {
            continue;
        };
        for id in known_ids(content) {
            let prefix = id.split('-').next().unwrap_or_default();
            if !owners_of(prefix).contains(doc_type) {
                continue;
            }
            let downstream_refs: Vec<DocType> = CHAIN_ORDER[origin_idx + 1..]
                .iter()
                .filter(|down| docs.get(down).map_or(false, |text| text.contains(id.as_str())))
                .copied()
                .collect();
            matrix.push(TraceabilityEntry {
                id,
                doc_type: *doc_type,
                downstream_refs,
            });
        }
    }

    matrix.sort_by(|a, b| a.id.cmp(&b.id));
    matrix
}

/// Analyze every chain edge with both documents present, reporting orphaned
/// and missing identifiers plus the traceability matrix and fix suggestions.
pub fn analyze_graph(docs: &BTreeMap<DocType, String>) -> ChainRefReport {
    let graph = build_id_graph(docs);
    let mut links = Vec::new();
    let mut all_orphaned = Vec::new();
    let mut all_missing = Vec::new();

    for &(upstream, downstream) in CHAIN_EDGES {
        let (Some(up_node), Some(down_node)) = (graph.get(&upstream), graph.get(&downstream))
        else {
            continue;
        };

        let mut link = ChainLinkReport {
            upstream,
            downstream,
            orphaned_ids: Vec::new(),
            missing_ids: Vec::new(),
        };

        for id in &up_node.defined {
            let prefix = id.split('-').next().unwrap_or_default();
            if !owners_of(prefix).contains(&upstream) {
                continue;
            }
            if !down_node.referenced.contains(id) {
                link.orphaned_ids.push(id.clone());
                all_orphaned.push(OrphanedId {
                    id: id.clone(),
                    defined_in: upstream,
                    expected_in: downstream,
                });
            }
        }

        for id in &down_node.referenced {
            let prefix = id.split('-').next().unwrap_or_default();
            if !owners_of(prefix).contains(&upstream) {
                continue;
            }
            if !up_node.defined.contains(id) {
                link.missing_ids.push(id.clone());
                all_missing.push(MissingId {
                    id: id.clone(),
                    referenced_in: downstream,
                    expected_from: upstream,
                });
            }
        }

        links.push(link);
    }

    let traceability_matrix = build_traceability_matrix(docs);
    let suggestions = generate_suggestions(&all_orphaned, &all_missing);

    ChainRefReport {
        links,
        orphaned_ids: all_orphaned,
        missing_ids: all_missing,
        traceability_matrix,
        suggestions,
    }
}

/// One human-readable line per finding.
pub fn generate_suggestions(orphaned: &[OrphanedId], missing: &[MissingId]) -> Vec<String> {
    let mut suggestions = Vec::new();
    for o in orphaned {
        suggestions.push(format!(
            "{} defined in {} but not referenced in {}",
            o.id,
            o.defined_in.name(),
            o.expected_in.name()
        ));
    }
    for m in missing {
        suggestions.push(format!(
            "{} referenced in {} but not defined in {}",
            m.id,
            m.referenced_in.name(),
            m.expected_from.name()
        ));
    }
    suggestions
}
