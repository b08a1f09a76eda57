//! Chain-order staleness check over document modification timestamps.

use crate::models::{DocType, CHAIN_ORDER};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authoring status of one chain document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocStatus {
    Pending,
    InProgress,
    Complete,
}

/// One chain document as recorded in the project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntry {
    pub doc_type: DocType,
    /// ISO date or RFC 3339 timestamp, absent for never-generated documents
    pub last_modified: Option<String>,
    pub status: DocStatus,
}

/// One upstream-newer-than-downstream finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessWarning {
    pub upstream: DocType,
    pub downstream: DocType,
    pub message: String,
}

/// Staleness summary across the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessData {
    pub overall_score: u32,
    pub stale_count: usize,
    pub total_docs: usize,
    pub warnings: Vec<StalenessWarning>,
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Flag chain documents whose nearest dated upstream was modified later.
///
/// For each downstream entry the scan walks upstream and stops at the first
/// entry carrying a timestamp, whether or not it warns. A document stale
/// relative to a more distant upstream is therefore not flagged as long as
/// its immediate dated predecessor is fresh. Known limitation, kept so
/// scores stay comparable across existing reports.
///
/// Pending or undated downstream documents are skipped. An empty entry list
/// scores 100.
pub fn compute_staleness(entries: &[ChainEntry]) -> StalenessData {
    let mut warnings = Vec::new();
    let entry_map: HashMap<DocType, &ChainEntry> =
        entries.iter().map(|e| (e.doc_type, e)).collect();

    for i in 1..CHAIN_ORDER.len() {
        let Some(downstream) = entry_map.get(&CHAIN_ORDER[i]) else {
            continue;
        };
        if downstream.status == DocStatus::Pending {
            continue;
        }
        let Some(down_time) = downstream.last_modified.as_deref().and_then(parse_timestamp)
        else {
            continue;
        };

        for j in (0..i).rev() {
            let Some(upstream) = entry_map.get(&CHAIN_ORDER[j]) else {
                continue;
            };
            let Some(up_raw) = upstream.last_modified.as_deref() else {
                continue;
            };
            if let Some(up_time) = parse_timestamp(up_raw) {
                if up_time > down_time {
                    warnings.push(StalenessWarning {
                        upstream: CHAIN_ORDER[j],
                        downstream: CHAIN_ORDER[i],
                        message: format!(
                            "{} may be outdated (upstream {} was modified later)",
                            CHAIN_ORDER[i].name(),
                            CHAIN_ORDER[j].name()
                        ),
                    });
                }
            }
            break;
        }
    }

    let stale_count = warnings.len();
    let overall_score = if entries.is_empty() {
        100
    } else {
        ((1.0 - stale_count as f64 / entries.len() as f64) * 100.0).round() as u32
    };

    StalenessData {
        overall_score,
        stale_count,
        total_docs: entries.len(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(doc_type: DocType, last_modified: Option<&str>, status: DocStatus) -> ChainEntry {
        ChainEntry {
            doc_type,
            last_modified: last_modified.map(|s| s.to_string()),
            status,
        }
    }

    #[test]
    fn test_newer_upstream_flags_downstream() {
        let entries = vec![
            entry(DocType::Requirements, Some("2024-01-05"), DocStatus::Complete),
            entry(DocType::BasicDesign, Some("2024-01-01"), DocStatus::Complete),
        ];
        let data = compute_staleness(&entries);
        assert_eq!(data.stale_count, 1);
        assert_eq!(data.warnings[0].upstream, DocType::Requirements);
        assert_eq!(data.warnings[0].downstream, DocType::BasicDesign);
        assert_eq!(data.overall_score, 50);
    }

    #[test]
    fn test_fresh_downstream_is_clean() {
        let entries = vec![
            entry(DocType::Requirements, Some("2024-01-01"), DocStatus::Complete),
            entry(DocType::BasicDesign, Some("2024-01-05"), DocStatus::Complete),
        ];
        let data = compute_staleness(&entries);
        assert_eq!(data.stale_count, 0);
        assert_eq!(data.overall_score, 100);
    }

    #[test]
    fn test_pending_downstream_skipped() {
        let entries = vec![
            entry(DocType::Requirements, Some("2024-01-05"), DocStatus::Complete),
            entry(DocType::BasicDesign, Some("2024-01-01"), DocStatus::Pending),
        ];
        assert_eq!(compute_staleness(&entries).stale_count, 0);
    }

    #[test]
    fn test_undated_downstream_skipped() {
        let entries = vec![
            entry(DocType::Requirements, Some("2024-01-05"), DocStatus::Complete),
            entry(DocType::BasicDesign, None, DocStatus::InProgress),
        ];
        assert_eq!(compute_staleness(&entries).stale_count, 0);
    }

    #[test]
    fn test_only_nearest_dated_upstream_consulted() {
        // detail-design is older than requirements, but its nearest dated
        // upstream (basic-design) is older still, so no warning fires.
        let entries = vec![
            entry(DocType::Requirements, Some("2024-01-05"), DocStatus::Complete),
            entry(DocType::BasicDesign, Some("2024-01-01"), DocStatus::Complete),
            entry(DocType::DetailDesign, Some("2024-01-03"), DocStatus::Complete),
        ];
        let data = compute_staleness(&entries);
        assert_eq!(data.stale_count, 1);
        assert_eq!(data.warnings[0].downstream, DocType::BasicDesign);
    }

    #[test]
    fn test_empty_entries_score_100() {
        let data = compute_staleness(&[]);
        assert_eq!(data.overall_score, 100);
        assert_eq!(data.total_docs, 0);
    }

    #[test]
    fn test_rfc3339_timestamps_compare() {
        let entries = vec![
            entry(DocType::Requirements, Some("2024-01-05T10:30:00Z"), DocStatus::Complete),
            entry(DocType::BasicDesign, Some("2024-01-05T09:00:00Z"), DocStatus::Complete),
        ];
        assert_eq!(compute_staleness(&entries).stale_count, 1);
    }
}
