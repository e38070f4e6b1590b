//! Markdown documents written section by section into the output directory.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Handle to `{title}.md` for one document of the current run.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    /// Prepare `{title}.md` under `dir`, deleting a previous file of that name.
    pub fn create(dir: &Path, title: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;
        let path = dir.join(file_name(title));
        if path.is_file() {
            warn!(path = %path.display(), "document already exists, deleting it");
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
        Ok(Self { path })
    }

    /// Append a blank line followed by `text`.
    pub fn append_section(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        file.write_all(b"\n\n")
            .and_then(|()| file.write_all(text.as_bytes()))
            .with_context(|| format!("append section to {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = text.len(), "section appended");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `{title}.md`, with path separators replaced so documents stay flat.
fn file_name(title: &str) -> String {
    let flat: String = title
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!("{flat}.md")
}
