//! Filesystem adapter for the reference flag corpus.

use anyhow::{bail, Context, Result};
use flag_id_core::{CorpusSource, ReferenceCorpus};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::fs::{collect_from_dir, load_flag_image};

/// Loads reference flags from a directory.
///
/// Each supported image becomes one flag named after its file stem, so
/// `flags/New York.png` is the flag `New York`. Flags are ordered by file
/// name. Files that fail to decode are skipped with a warning.
pub struct FsCorpusSource {
    dir: PathBuf,
    recursive: bool,
}

impl FsCorpusSource {
    /// Creates a corpus source over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recursive: false,
        }
    }

    /// Also reads flags from subdirectories.
    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// The corpus directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CorpusSource for FsCorpusSource {
    fn load_corpus(&self) -> Result<ReferenceCorpus> {
        if !self.dir.is_dir() {
            bail!("Corpus directory not found: {}", self.dir.display());
        }

        let mut files = Vec::new();
        collect_from_dir(&self.dir, self.recursive, &mut files);
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
        debug!("Found {} reference images in {}", files.len(), self.dir.display());

        let mut corpus = ReferenceCorpus::new();
        for path in files {
            let Some(id) = flag_id(&path) else {
                warn!("Skipping reference with unusable name: {}", path.display());
                continue;
            };
            match load_flag_image(&path, id) {
                Ok(flag) => corpus
                    .insert(flag)
                    .with_context(|| format!("Failed to add {}", path.display()))?,
                Err(e) => warn!("Skipping reference {}: {e:#}", path.display()),
            }
        }

        info!("Loaded {} reference flags", corpus.len());
        Ok(corpus)
    }
}

/// Flag identifier for a reference file: its stem.
fn flag_id(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
