//! Identifier extraction from document text.
//!
//! Recognizes typed cross-reference identifiers in three shapes, in this
//! precedence order:
//!
//! 1. feature-scoped, e.g. `SCR-SAL-001` (only SCR, RPT, TBL, API scope)
//! 2. standard, e.g. `REQ-001`, `F-012`
//! 3. custom 2-5 letter prefixes, e.g. `SAL-002`, bucketed as `OTHER`
//!
//! A token consumed by a feature-scoped match is never re-admitted as a bare
//! custom identifier (the `SAL-001` inside `SCR-SAL-001`). Extraction is a
//! pure function of the input text.

use crate::error::ChainError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Prefixes with a defined meaning in the document chain.
pub const KNOWN_PREFIXES: &[&str] = &[
    "F", "REQ", "NFR", "SCR", "TBL", "API", "RPT", "CLS", "DD", "TS", "UT", "IT", "ST", "UAT",
    "SEC", "PP", "TP", "OP", "MIG", "EV", "MTG", "ADR", "IF", "PG",
];

/// Prefixes that admit a feature-scope segment (`SCR-SAL-001`).
pub const FEATURE_SCOPED_PREFIXES: &[&str] = &["SCR", "RPT", "TBL", "API"];

/// Bucket name for identifiers with an unrecognized prefix.
pub const OTHER_BUCKET: &str = "OTHER";

fn standard_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(F|REQ|NFR|SCR|TBL|API|RPT|CLS|DD|TS|UT|IT|ST|UAT|SEC|PP|TP|OP|MIG|EV|MTG|ADR|IF|PG)-(\d{1,4})\b",
        )
        .unwrap()
    })
}

fn feature_scoped_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(SCR|RPT|TBL|API)-([A-Z]{2,5})-(\d{1,4})\b").unwrap())
}

fn custom_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z]{2,5})-(\d{1,4})\b").unwrap())
}

fn full_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{1,5}-(?:[A-Z]{2,5}-)?\d{1,4}$").unwrap())
}

fn prefix_arg_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{1,5}$").unwrap())
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| start < e && end > s)
}

/// True when the text right before `start` ends in an uppercase prefix plus
/// a hyphen, i.e. the candidate token is the tail of a larger identifier.
fn has_dangling_prefix(text: &str, start: usize) -> bool {
    let head = &text.as_bytes()[..start];
    if head.last() != Some(&b'-') {
        return false;
    }
    let letters = head[..head.len() - 1]
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    (1..=5).contains(&letters)
}

fn push_unique(groups: &mut BTreeMap<String, Vec<String>>, bucket: &str, token: &str) {
    let entries = groups.entry(bucket.to_string()).or_default();
    if !entries.iter().any(|t| t == token) {
        entries.push(token.to_string());
    }
}

/// Extract all identifiers from text, grouped by prefix.
///
/// Feature-scoped identifiers are bucketed under their base prefix; tokens
/// with an unrecognized prefix land in [`OTHER_BUCKET`]. Each bucket keeps
/// first-occurrence order without duplicates.
pub fn extract_identifiers(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut scoped_spans: Vec<(usize, usize)> = Vec::new();

    for caps in feature_scoped_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        scoped_spans.push((whole.start(), whole.end()));
        push_unique(&mut groups, &caps[1], whole.as_str());
    }

    for caps in standard_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if overlaps(&scoped_spans, whole.start(), whole.end()) {
            continue;
        }
        push_unique(&mut groups, &caps[1], whole.as_str());
    }

    for caps in custom_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if KNOWN_PREFIXES.contains(&&caps[1]) {
            continue;
        }
        if overlaps(&scoped_spans, whole.start(), whole.end())
            || has_dangling_prefix(text, whole.start())
        {
            continue;
        }
        push_unique(&mut groups, OTHER_BUCKET, whole.as_str());
    }

    groups
}

/// Extract every identifier as a flat set, feature-scoped forms included.
pub fn extract_all(text: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    let mut scoped_spans: Vec<(usize, usize)> = Vec::new();

    for m in feature_scoped_re().find_iter(text) {
        scoped_spans.push((m.start(), m.end()));
        ids.insert(m.as_str().to_string());
    }
    for m in standard_re().find_iter(text) {
        if !overlaps(&scoped_spans, m.start(), m.end()) {
            ids.insert(m.as_str().to_string());
        }
    }
    for m in custom_re().find_iter(text) {
        if overlaps(&scoped_spans, m.start(), m.end()) || has_dangling_prefix(text, m.start()) {
            continue;
        }
        ids.insert(m.as_str().to_string());
    }

    ids
}

/// Extract identifiers of a single prefix, in first-occurrence order.
///
/// A prefix argument that does not match `^[A-Z]{1,5}$` yields an empty list
/// rather than an error. Feature-scopable prefixes also match their scoped
/// form.
pub fn extract_by_type(text: &str, prefix: &str) -> Vec<String> {
    if !prefix_arg_re().is_match(prefix) {
        return Vec::new();
    }

    let pattern = if FEATURE_SCOPED_PREFIXES.contains(&prefix) {
        format!(r"\b{prefix}-(?:[A-Z]{{2,5}}-)?\d{{1,4}}\b")
    } else {
        format!(r"\b{prefix}-\d{{1,4}}\b")
    };
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut ids: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        if !ids.iter().any(|t| t == m.as_str()) {
            ids.push(m.as_str().to_string());
        }
    }
    ids
}

/// Validate a single token against the identifier grammar.
///
/// For callers admitting user input into `changed_ids` and similar fields.
pub fn validate_identifier(token: &str) -> Result<(), ChainError> {
    if full_token_re().is_match(token) {
        Ok(())
    } else {
        Err(ChainError::MalformedIdPattern(token.to_string()))
    }
}
