//! Corpus source port for loading reference flags.

use crate::domain::ReferenceCorpus;

/// Port for loading the reference flags a match engine is built from.
pub trait CorpusSource: Send + Sync {
    /// Loads every reference flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be read or holds duplicate identifiers.
    fn load_corpus(&self) -> anyhow::Result<ReferenceCorpus>;
}
