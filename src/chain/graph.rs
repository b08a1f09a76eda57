//! The fixed precedence graph over document types.
//!
//! Edges read `(upstream, downstream)`: the downstream document is derived
//! from the upstream one. The edge set and the prefix-ownership table are
//! process-wide constants; acyclicity is asserted by a test below.

use crate::models::DocType;

/// Precedence edges of the document chain.
pub const CHAIN_EDGES: &[(DocType, DocType)] = &[
    // Requirements phase
    (DocType::FunctionsList, DocType::Requirements),
    (DocType::Requirements, DocType::Nfr),
    (DocType::Requirements, DocType::ProjectPlan),
    // Design phase
    (DocType::Requirements, DocType::BasicDesign),
    (DocType::Nfr, DocType::BasicDesign),
    (DocType::Sitemap, DocType::BasicDesign),
    (DocType::BasicDesign, DocType::SecurityDesign),
    (DocType::BasicDesign, DocType::DetailDesign),
    (DocType::SecurityDesign, DocType::DetailDesign),
    // Test phase, paired V-model style with the level each spec validates
    (DocType::ProjectPlan, DocType::TestPlan),
    (DocType::DetailDesign, DocType::UtSpec),
    (DocType::TestPlan, DocType::UtSpec),
    (DocType::BasicDesign, DocType::ItSpec),
    (DocType::TestPlan, DocType::ItSpec),
    (DocType::Requirements, DocType::StSpec),
    (DocType::TestPlan, DocType::StSpec),
    (DocType::Requirements, DocType::UatSpec),
    (DocType::TestPlan, DocType::UatSpec),
    // Supplementary design documents
    (DocType::BasicDesign, DocType::OperationDesign),
    (DocType::BasicDesign, DocType::MigrationDesign),
];

/// Identifier prefix to the document type(s) that define that class of id.
///
/// EV, MTG, ADR and IF are recognized prefixes whose defining documents live
/// outside the chain; they have no entry here and backfill skips them.
pub const ID_OWNERS: &[(&str, &[DocType])] = &[
    ("F", &[DocType::FunctionsList]),
    ("REQ", &[DocType::Requirements]),
    ("NFR", &[DocType::Nfr]),
    ("PP", &[DocType::ProjectPlan]),
    ("SCR", &[DocType::BasicDesign]),
    ("TBL", &[DocType::BasicDesign]),
    ("API", &[DocType::BasicDesign]),
    ("RPT", &[DocType::BasicDesign]),
    ("SEC", &[DocType::SecurityDesign]),
    ("CLS", &[DocType::DetailDesign]),
    ("DD", &[DocType::DetailDesign]),
    ("TP", &[DocType::TestPlan]),
    ("TS", &[DocType::TestPlan]),
    ("UT", &[DocType::UtSpec]),
    ("IT", &[DocType::ItSpec]),
    ("ST", &[DocType::StSpec]),
    ("UAT", &[DocType::UatSpec]),
    ("OP", &[DocType::OperationDesign]),
    ("MIG", &[DocType::MigrationDesign]),
    ("PG", &[DocType::Sitemap]),
];

/// Document types that define identifiers with the given prefix.
///
/// Unknown or unowned prefixes yield an empty slice, never an error.
pub fn owners_of(prefix: &str) -> &'static [DocType] {
    ID_OWNERS
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, owners)| *owners)
        .unwrap_or(&[])
}

/// Direct predecessors of a document type, in edge-list order.
pub fn upstream_neighbors(doc: DocType) -> Vec<DocType> {
    CHAIN_EDGES
        .iter()
        .filter(|(_, downstream)| *downstream == doc)
        .map(|(upstream, _)| *upstream)
        .collect()
}

/// Direct successors of a document type, in edge-list order.
pub fn downstream_neighbors(doc: DocType) -> Vec<DocType> {
    CHAIN_EDGES
        .iter()
        .filter(|(upstream, _)| *upstream == doc)
        .map(|(_, downstream)| *downstream)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ALL_DOC_TYPES;
    use std::collections::HashSet;

    #[test]
    fn test_graph_is_acyclic() {
        // Kahn peeling: repeatedly remove sink-free nodes; leftovers mean a cycle.
        let mut edges: Vec<(DocType, DocType)> = CHAIN_EDGES.to_vec();
        let mut nodes: HashSet<DocType> = ALL_DOC_TYPES.iter().copied().collect();
        loop {
            let removable: Vec<DocType> = nodes
                .iter()
                .copied()
                .filter(|n| !edges.iter().any(|(_, downstream)| downstream == n))
                .collect();
            if removable.is_empty() {
                break;
            }
            for n in &removable {
                nodes.remove(n);
            }
            edges.retain(|(upstream, _)| !removable.contains(upstream));
        }
        assert!(nodes.is_empty(), "cycle among {:?}", nodes);
    }

    #[test]
    fn test_every_doc_type_appears_in_graph() {
        for doc in ALL_DOC_TYPES {
            let connected = CHAIN_EDGES
                .iter()
                .any(|(up, down)| up == doc || down == doc);
            assert!(connected, "{} has no edges", doc);
        }
    }

    #[test]
    fn test_owners_of_known_prefixes() {
        assert_eq!(owners_of("F"), &[DocType::FunctionsList]);
        assert_eq!(owners_of("SCR"), &[DocType::BasicDesign]);
        assert_eq!(owners_of("UAT"), &[DocType::UatSpec]);
    }

    #[test]
    fn test_owners_of_unowned_prefix_is_empty() {
        assert!(owners_of("EV").is_empty());
        assert!(owners_of("ADR").is_empty());
        assert!(owners_of("XYZ").is_empty());
    }

    #[test]
    fn test_neighbor_lookups() {
        assert_eq!(upstream_neighbors(DocType::Requirements), vec![DocType::FunctionsList]);
        assert!(upstream_neighbors(DocType::FunctionsList).is_empty());
        assert!(downstream_neighbors(DocType::UtSpec).is_empty());
        assert!(downstream_neighbors(DocType::BasicDesign).contains(&DocType::DetailDesign));
    }
}
