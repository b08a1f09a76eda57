//! Impact analysis: which sections of which documents reference a set of
//! changed identifiers.
//!
//! Documents are split on markdown headings (`#` through `####`); text before
//! the first heading forms an implicit `_preamble` section. Referencing is a
//! literal substring check, not structural parsing.

use crate::models::DocType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Section name for text preceding the first heading.
pub const PREAMBLE_SECTION: &str = "_preamble";

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,4})\s+(.+)$").unwrap())
}

/// How prominently a section references the changed identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactSeverity {
    /// An id appears in the section heading itself
    High,
    /// An id appears in a table row
    Medium,
    /// An id appears only in body prose
    Low,
}

impl ImpactSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            ImpactSeverity::High => "high",
            ImpactSeverity::Medium => "medium",
            ImpactSeverity::Low => "low",
        }
    }

    /// Marker used in diagram labels.
    pub fn symbol(&self) -> &'static str {
        match self {
            ImpactSeverity::High => "🔴",
            ImpactSeverity::Medium => "🟡",
            ImpactSeverity::Low => "🟢",
        }
    }
}

/// One document section that references at least one changed identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub doc_type: DocType,
    pub section: String,
    pub referenced_ids: Vec<String>,
    pub severity: ImpactSeverity,
}

/// Aggregated impact analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub changed_ids: Vec<String>,
    pub affected_docs: Vec<ImpactEntry>,
    pub total_affected_sections: usize,
    /// Mermaid flowchart of the reference relation
    pub dependency_graph: String,
    /// One human-readable line per affected section
    pub suggested_actions: Vec<String>,
}

/// Find all sections across the supplied documents that reference any of the
/// changed identifiers. Sections with no references are omitted.
pub fn find_affected_sections(
    changed_ids: &[String],
    docs: &BTreeMap<DocType, String>,
) -> Vec<ImpactEntry> {
    let mut entries = Vec::new();

    for (doc_type, content) in docs {
        let mut current_section = PREAMBLE_SECTION.to_string();
        let mut section_body = String::new();

        for line in content.lines() {
            if let Some(caps) = heading_re().captures(line) {
                flush_section(&mut entries, *doc_type, &current_section, &section_body, changed_ids);
                current_section = caps[2].trim().to_string();
                section_body.clear();
            }
            section_body.push_str(line);
            section_body.push('\n');
        }
        flush_section(&mut entries, *doc_type, &current_section, &section_body, changed_ids);
    }

    entries
}

fn flush_section(
    entries: &mut Vec<ImpactEntry>,
    doc_type: DocType,
    section: &str,
    body: &str,
    changed_ids: &[String],
) {
    let referenced: Vec<String> = changed_ids
        .iter()
        .filter(|id| body.contains(id.as_str()))
        .cloned()
        .collect();
    if referenced.is_empty() {
        return;
    }
    let severity = score_severity(section, &referenced, body);
    entries.push(ImpactEntry {
        doc_type,
        section: section.to_string(),
        referenced_ids: referenced,
        severity,
    });
}

fn score_severity(section: &str, referenced_ids: &[String], body: &str) -> ImpactSeverity {
    if referenced_ids.iter().any(|id| section.contains(id.as_str())) {
        return ImpactSeverity::High;
    }
    for line in body.lines() {
        if !line.trim().starts_with('|') {
            continue;
        }
        if referenced_ids.iter().any(|id| line.contains(id.as_str())) {
            return ImpactSeverity::Medium;
        }
    }
    ImpactSeverity::Low
}

fn sanitize_node_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Render the impact cascade as a fenced Mermaid flowchart.
pub fn build_dependency_mermaid(entries: &[ImpactEntry], changed_ids: &[String]) -> String {
    let mut lines = vec!["```mermaid".to_string(), "flowchart TD".to_string()];

    for id in changed_ids {
        lines.push(format!("  {}[\"🔴 {} (changed)\"]", id, id));
    }

    let mut seen: HashSet<String> = HashSet::new();
    for entry in entries {
        let node_id = sanitize_node_id(&format!("{}_{}", entry.doc_type.name(), entry.section));
        if !seen.insert(node_id.clone()) {
            continue;
        }
        lines.push(format!(
            "  {}[\"{} {}: {}\"]",
            node_id,
            entry.severity.symbol(),
            entry.doc_type.name(),
            entry.section
        ));
        for id in &entry.referenced_ids {
            lines.push(format!("  {} --> {}", id, node_id));
        }
    }

    lines.push("```".to_string());
    lines.join("\n")
}

/// Package the full impact report for a changed-id set.
pub fn build_impact_report(changed_ids: &[String], entries: Vec<ImpactEntry>) -> ImpactReport {
    let dependency_graph = build_dependency_mermaid(&entries, changed_ids);
    let suggested_actions = entries
        .iter()
        .map(|e| {
            format!(
                "Update {} section \"{}\" — references: {}",
                e.doc_type.name(),
                e.section,
                e.referenced_ids.join(", ")
            )
        })
        .collect();

    ImpactReport {
        changed_ids: changed_ids.to_vec(),
        total_affected_sections: entries.len(),
        dependency_graph,
        suggested_actions,
        affected_docs: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn docs(pairs: &[(DocType, &str)]) -> BTreeMap<DocType, String> {
        pairs.iter().map(|(d, c)| (*d, c.to_string())).collect()
    }

    #[test]
    fn test_sections_without_references_omitted() {
        let docs = docs(&[(
            DocType::BasicDesign,
            "# Screens\nSCR-001 layout\n\n# Tables\nnothing relevant here\n",
        )]);
        let entries = find_affected_sections(&ids(&["SCR-001"]), &docs);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].section, "Screens");
        assert_eq!(entries[0].referenced_ids, vec!["SCR-001"]);
    }

    #[test]
    fn test_preamble_is_its_own_section() {
        let docs = docs(&[(DocType::Requirements, "REQ-001 appears before any heading\n\n# Later\nnothing\n")]);
        let entries = find_affected_sections(&ids(&["REQ-001"]), &docs);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].section, PREAMBLE_SECTION);
    }

    #[test]
    fn test_severity_high_when_id_in_heading() {
        let docs = docs(&[(DocType::BasicDesign, "## SCR-001 Login screen\nBody text\n")]);
        let entries = find_affected_sections(&ids(&["SCR-001"]), &docs);
        assert_eq!(entries[0].severity, ImpactSeverity::High);
    }

    #[test]
    fn test_severity_medium_when_id_in_table_row() {
        let docs = docs(&[(
            DocType::BasicDesign,
            "## Screen list\n| ID | Name |\n|----|------|\n| SCR-001 | Login |\n",
        )]);
        let entries = find_affected_sections(&ids(&["SCR-001"]), &docs);
        assert_eq!(entries[0].severity, ImpactSeverity::Medium);
    }

    #[test]
    fn test_severity_low_for_prose_reference() {
        let docs = docs(&[(DocType::DetailDesign, "## Flow\nThe handler behind SCR-001 calls the API.\n")]);
        let entries = find_affected_sections(&ids(&["SCR-001"]), &docs);
        assert_eq!(entries[0].severity, ImpactSeverity::Low);
    }

    #[test]
    fn test_multiple_documents_scanned() {
        let docs = docs(&[
            (DocType::Requirements, "# Reqs\nREQ-001 described\n"),
            (DocType::BasicDesign, "# Design\nImplements REQ-001\n"),
            (DocType::UtSpec, "# Tests\nnothing\n"),
        ]);
        let entries = find_affected_sections(&ids(&["REQ-001"]), &docs);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_mermaid_shape() {
        let docs = docs(&[(DocType::BasicDesign, "## Screens\n| SCR-001 | Login |\n")]);
        let entries = find_affected_sections(&ids(&["SCR-001"]), &docs);
        let graph = build_dependency_mermaid(&entries, &ids(&["SCR-001"]));
        assert!(graph.starts_with("```mermaid\nflowchart TD"));
        assert!(graph.contains("SCR-001[\"🔴 SCR-001 (changed)\"]"));
        assert!(graph.contains("SCR-001 --> basic_design_Screens"));
        assert!(graph.ends_with("```"));
    }

    #[test]
    fn test_report_aggregation() {
        let docs = docs(&[
            (DocType::Requirements, "# Reqs\nREQ-001\n"),
            (DocType::BasicDesign, "# Design\nREQ-001\n"),
        ]);
        let changed = ids(&["REQ-001"]);
        let entries = find_affected_sections(&changed, &docs);
        let report = build_impact_report(&changed, entries);
        assert_eq!(report.total_affected_sections, 2);
        assert_eq!(report.suggested_actions.len(), 2);
        assert!(report.suggested_actions[0].contains("requirements"));
        assert!(report.dependency_graph.contains("flowchart TD"));
    }
}
