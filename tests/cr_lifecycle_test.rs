//! Integration tests for the change request lifecycle and the analytics
//! pipeline: store-backed CR flow from creation to completion, and the
//! impact/backfill/scoring path over a small document chain.

use std::collections::BTreeMap;

use tempfile::TempDir;
use tracelink::analysis::{
    analyze_graph, build_impact_report, build_traceability_matrix, find_affected_sections,
    generate_backfill_suggestions,
};
use tracelink::scoring::{
    compute_coverage_metrics, compute_health_score, compute_risk_score, compute_staleness,
    ChainEntry, DocStatus, DocValidation, RiskBreakdown, RiskGrade, ValidationIssue,
};
use tracelink::state::{
    all_steps_resolved, approve, instruct_next_step, plan_propagation, resolve_instructed_step,
    transition,
};
use tracelink::{CrStatus, CrStore, DocType, PropagationOptions, StepDirection, StepStatus};

fn sample_docs() -> BTreeMap<DocType, String> {
    let mut docs = BTreeMap::new();
    docs.insert(
        DocType::FunctionsList,
        "# Functions\n\n| ID | Name |\n|----|------|\n| F-001 | Login |\n| F-002 | Search |\n"
            .to_string(),
    );
    docs.insert(
        DocType::Requirements,
        "# Requirements\n\n## REQ-001 Authentication\nCovers F-001.\n\n## Search\nREQ-002 covers F-002.\n"
            .to_string(),
    );
    docs.insert(
        DocType::BasicDesign,
        "# Basic design\n\n## Screens\n| SCR-001 | Login screen | REQ-001 |\n\n## Open items\nREQ-002 pending design.\n"
            .to_string(),
    );
    docs.insert(
        DocType::UtSpec,
        "# Unit tests\n\nUT-001 exercises REQ-001 via SCR-001.\n".to_string(),
    );
    docs
}

#[test]
fn test_full_change_request_lifecycle() {
    let temp = TempDir::new().unwrap();
    let store = CrStore::open(temp.path().join("change-requests"));
    let docs = sample_docs();

    // Create and start analysis.
    let mut cr = store
        .create(
            DocType::Requirements,
            "Split REQ-001 into separate auth flows",
            vec!["REQ-001".to_string()],
        )
        .unwrap();
    transition(&mut cr, CrStatus::Analyzing, None, "2024-02-01").unwrap();

    // Impact analysis over the current chain.
    let entries = find_affected_sections(&cr.changed_ids, &docs);
    let report = build_impact_report(&cr.changed_ids, entries);
    assert_eq!(report.total_affected_sections, 3);
    cr.impact_summary = Some(format!(
        "{} affected sections",
        report.total_affected_sections
    ));

    // Plan propagation and finish analysis.
    let steps = plan_propagation(&mut cr, &PropagationOptions::default()).unwrap();
    assert!(steps.iter().all(|s| s.doc_type != DocType::Requirements));
    let first_direction = steps[0].direction;
    assert_eq!(first_direction, StepDirection::Upstream);
    transition(&mut cr, CrStatus::ImpactAnalyzed, Some("analysis complete".to_string()), "2024-02-01")
        .unwrap();
    store.save(&cr).unwrap();

    // A second, already-propagating request shares a document type.
    let mut rival = store
        .create(DocType::BasicDesign, "Rework screen layout", vec!["SCR-001".to_string()])
        .unwrap();
    transition(&mut rival, CrStatus::Analyzing, None, "2024-02-01").unwrap();
    plan_propagation(&mut rival, &PropagationOptions::default()).unwrap();
    transition(&mut rival, CrStatus::ImpactAnalyzed, None, "2024-02-01").unwrap();
    approve(&mut rival, &[], "2024-02-01").unwrap();
    store.save(&rival).unwrap();

    // Approval surfaces the contention without blocking it.
    let pool = store.list().unwrap();
    let conflicts = approve(&mut cr, &pool, "2024-02-02").unwrap();
    assert_eq!(cr.status, CrStatus::Approved);
    assert!(!conflicts.is_empty());
    assert!(!cr.conflict_warnings.is_empty());

    // Walk every step: instruct, then confirm.
    let total = cr.propagation_steps.len();
    for i in 0..total {
        let target_text = docs.get(&cr.propagation_steps[cr.propagation_index].doc_type);
        let instruction =
            instruct_next_step(&mut cr, None, target_text.map(String::as_str), "2024-02-03")
                .unwrap();
        assert_eq!(instruction.step, i + 1);
        resolve_instructed_step(&mut cr, StepStatus::Done, None, None, "2024-02-03").unwrap();
    }
    assert_eq!(cr.status, CrStatus::Propagating);
    assert!(all_steps_resolved(&cr));

    // Close out.
    transition(&mut cr, CrStatus::Validated, None, "2024-02-04").unwrap();
    transition(&mut cr, CrStatus::Completed, Some("all steps confirmed".to_string()), "2024-02-04")
        .unwrap();
    store.save(&cr).unwrap();

    let reloaded = store.load(&cr.id).unwrap();
    assert_eq!(reloaded.status, CrStatus::Completed);
    assert!(all_steps_resolved(&reloaded));
    assert_eq!(reloaded.history.last().unwrap().status, CrStatus::Completed);
}

#[test]
fn test_backfill_follows_regeneration() {
    let docs = sample_docs();
    let old_body = docs[&DocType::BasicDesign].clone();
    let new_body = format!("{old_body}\n## New report\nRPT-001 summarizes F-009.\n");

    let upstream: BTreeMap<DocType, String> = docs
        .iter()
        .filter(|(d, _)| **d == DocType::FunctionsList || **d == DocType::Requirements)
        .map(|(d, c)| (*d, c.clone()))
        .collect();

    let suggestions =
        generate_backfill_suggestions(DocType::BasicDesign, &old_body, &new_body, &upstream);
    // F-009 is new and undefined upstream; RPT-001 is owned by the origin.
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].id, "F-009");
    assert_eq!(suggestions[0].target_doc, DocType::FunctionsList);
}

#[test]
fn test_scoring_pipeline_over_chain() {
    let docs = sample_docs();

    // Cross-reference analysis feeds coverage.
    let report = analyze_graph(&docs);
    assert!(report.missing_ids.is_empty());
    let matrix = build_traceability_matrix(&docs);
    let coverage = compute_coverage_metrics(&matrix);
    assert!(coverage.overall > 0);
    assert_eq!(coverage.req_to_test, 50);

    // Staleness over configuration entries.
    let entries = vec![
        ChainEntry {
            doc_type: DocType::FunctionsList,
            last_modified: Some("2024-01-01".to_string()),
            status: DocStatus::Complete,
        },
        ChainEntry {
            doc_type: DocType::Requirements,
            last_modified: Some("2024-01-10".to_string()),
            status: DocStatus::Complete,
        },
        ChainEntry {
            doc_type: DocType::BasicDesign,
            last_modified: Some("2024-01-05".to_string()),
            status: DocStatus::Complete,
        },
    ];
    let staleness = compute_staleness(&entries);
    assert_eq!(staleness.stale_count, 1);
    assert_eq!(staleness.warnings[0].downstream, DocType::BasicDesign);
    assert_eq!(staleness.overall_score, 67);

    // Health from externally supplied validation results.
    let health = compute_health_score(&[
        DocValidation {
            doc_type: DocType::Requirements,
            issues: vec![],
        },
        DocValidation {
            doc_type: DocType::BasicDesign,
            issues: vec![ValidationIssue::warning("section stub")],
        },
    ]);
    assert_eq!(health.overall, 99);

    // Risk folds the dimensions together.
    let risk = compute_risk_score(RiskBreakdown {
        trace_completeness: coverage.overall as f64,
        nfr_coverage: 50.0,
        test_coverage: coverage.req_to_test as f64,
        freshness: staleness.overall_score as f64,
        structural_health: health.overall as f64,
    });
    assert_eq!(risk.grade, RiskGrade::Yellow);
}

#[test]
fn test_report_serialization_shape() {
    let docs = sample_docs();
    let changed = vec!["REQ-001".to_string()];
    let entries = find_affected_sections(&changed, &docs);
    let report = build_impact_report(&changed, entries);

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["changed_ids"][0], "REQ-001");
    assert_eq!(value["total_affected_sections"], 3);
    assert!(value["dependency_graph"]
        .as_str()
        .unwrap()
        .contains("flowchart TD"));
    assert!(value["affected_docs"][0]["severity"].is_string());
    assert!(value["suggested_actions"].as_array().unwrap().len() == 3);
}
