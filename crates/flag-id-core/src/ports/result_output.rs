//! Result output port for writing identification results.

use crate::domain::IdentifyResult;

/// Port for outputting identification results.
pub trait ResultOutput: Send + Sync {
    /// Writes the result for one query.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, result: &IdentifyResult) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
