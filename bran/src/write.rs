//! Document writing for one goal: structure, then section by section.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::knowledge::KnowledgeStore;
use crate::core::types::{DocumentStructure, SectionKnowledgeRequest};
use crate::io::document::DocumentFile;

/// What a document is written for.
#[derive(Debug, Clone, Copy)]
pub struct Brief<'a> {
    pub objective: &'a str,
    /// Planner reply as given to every prompt.
    pub plan: &'a str,
    pub goal: &'a str,
}

/// Model-backed steps of the writer.
pub trait DocumentSteps {
    fn structure(&self, brief: &Brief<'_>) -> Result<DocumentStructure>;
    /// Which of `keys` the `section` depends on.
    fn required_knowledge(
        &self,
        brief: &Brief<'_>,
        keys: &[&str],
        section: &str,
    ) -> Result<SectionKnowledgeRequest>;
    /// Section text written from `knowledge` only.
    fn write_section(
        &self,
        brief: &Brief<'_>,
        section: &str,
        knowledge: &[&str],
    ) -> Result<String>;
}

/// Write the document for `brief.goal` into `out_dir` and return its path.
///
/// Returns `None` when the structure lists no sections, since nothing is
/// appended and no file exists.
///
/// A key requested by a section but absent from `knowledge` aborts with
/// [`crate::core::knowledge::MissingKnowledgeError`]; sections already
/// appended stay on disk.
#[instrument(skip_all, fields(goal = %brief.goal))]
pub fn write_document<W: DocumentSteps + ?Sized>(
    steps: &W,
    brief: &Brief<'_>,
    knowledge: &KnowledgeStore,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    let structure = steps.structure(brief)?;
    info!(
        title = %structure.title,
        sections = ?structure.sections,
        "document structure"
    );
    let document = DocumentFile::create(out_dir, &structure.title)?;
    if structure.sections.is_empty() {
        warn!(title = %structure.title, "document has no sections, nothing written");
        return Ok(None);
    }
    let available = knowledge.keys();

    for section in &structure.sections {
        let request = steps.required_knowledge(brief, &available, section)?;
        let keys = request.keys();
        info!(section = %section, needs = ?keys, "writing section");
        let values = knowledge
            .lookup_all(&keys)
            .with_context(|| format!("section {section:?} of {:?}", structure.title))?;
        let text = steps.write_section(brief, section, &values)?;
        document.append_section(&text)?;
    }

    info!(path = %document.path().display(), "document written");
    Ok(Some(document.path().to_path_buf()))
}
