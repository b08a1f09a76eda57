//! File-backed change request store.
//!
//! One Markdown file per request, named `<id>.md`, with the full record in
//! YAML frontmatter and a generated body for human readers. The store is the
//! persistence collaborator of the engine; everything else in this crate
//! stays I/O-free.

use crate::error::ChainError;
use crate::models::{ChangeRequest, DocType};
use crate::state::machine::{generate_cr_id, is_valid_cr_id, MAX_PROPAGATION_STEPS};
use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

fn cr_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CR-\d{6}-\d{3}\.md$").unwrap())
}

/// Change request store rooted at one directory.
pub struct CrStore {
    dir: PathBuf,
}

impl CrStore {
    /// Open a store at `dir`. The directory is created lazily on first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a request id.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.md"))
    }

    /// Allocate the next id for today and persist a new INITIATED request.
    pub fn create(
        &self,
        origin_doc: DocType,
        description: impl Into<String>,
        changed_ids: Vec<String>,
    ) -> Result<ChangeRequest> {
        let today = Utc::now().date_naive();
        let existing = self.existing_ids()?;
        let id = generate_cr_id(today, &existing);
        let now = today.format("%Y-%m-%d").to_string();

        let cr = ChangeRequest::new(id, origin_doc, description, changed_ids, &now);
        self.save(&cr)?;
        info!(id = %cr.id, origin = cr.origin_doc.name(), "change request created");
        Ok(cr)
    }

    /// Load a request by id.
    pub fn load(&self, id: &str) -> Result<ChangeRequest> {
        if !is_valid_cr_id(id) {
            return Err(ChainError::InvalidCrId(id.to_string()).into());
        }
        let path = self.path_for(id);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read change request file {}", path.display()))?;
        parse_cr_file(&raw)
    }

    /// Persist a request, overwriting any existing file for its id.
    pub fn save(&self, cr: &ChangeRequest) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .context("Failed to create change request directory")?;
        let rendered = render_cr_file(cr)?;
        std::fs::write(self.path_for(&cr.id), rendered)
            .with_context(|| format!("Failed to write change request {}", cr.id))?;
        debug!(id = %cr.id, status = cr.status.name(), "change request saved");
        Ok(())
    }

    /// All readable requests, sorted by id. Files that fail parsing or the
    /// corruption guards are skipped.
    pub fn list(&self) -> Result<Vec<ChangeRequest>> {
        let mut requests = Vec::new();
        for id in self.existing_ids()? {
            match self.load(&id) {
                Ok(cr) => requests.push(cr),
                Err(err) => {
                    debug!(id = %id, %err, "skipping unreadable change request file");
                }
            }
        }
        requests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(requests)
    }

    fn existing_ids(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };
        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if cr_file_re().is_match(name) {
                ids.push(name.trim_end_matches(".md").to_string());
            }
        }
        Ok(ids)
    }
}

fn parse_cr_file(raw: &str) -> Result<ChangeRequest> {
    let rest = raw
        .strip_prefix("---\n")
        .context("Invalid change request file: missing YAML frontmatter")?;
    let end = rest
        .find("\n---")
        .context("Invalid change request file: unterminated frontmatter")?;
    let cr: ChangeRequest = serde_yaml::from_str(&rest[..end])
        .context("Failed to parse change request frontmatter")?;

    if cr.propagation_steps.len() > MAX_PROPAGATION_STEPS {
        return Err(ChainError::StepLimitExceeded {
            count: cr.propagation_steps.len(),
            max: MAX_PROPAGATION_STEPS,
        }
        .into());
    }
    Ok(cr)
}

fn render_cr_file(cr: &ChangeRequest) -> Result<String> {
    let frontmatter =
        serde_yaml::to_string(cr).context("Failed to serialize change request")?;

    let mut body = String::new();
    body.push_str(&format!("# Change Request: {}\n\n", cr.description));
    body.push_str("## Changed IDs\n");
    for id in &cr.changed_ids {
        body.push_str(&format!("- {id}\n"));
    }
    body.push_str("\n## Notes\n(operator notes go here)\n");

    Ok(format!("---\n{frontmatter}---\n\n{body}"))
}
