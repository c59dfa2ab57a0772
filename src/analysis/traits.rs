//! Analysis trait abstractions
//!
//! The tempo analyzer is the boundary to whatever knows a file's tempo:
//! file name conventions, a detector, or a test double.

use crate::error::Result;
use crate::types::TempoResult;
use std::path::Path;

/// Tempo/beat-count backend
pub trait TempoAnalyzer {
    /// Determine tempo, beat count and duration of the file at `path`
    fn analyze(&self, path: &Path) -> Result<TempoResult>;

    /// Get the name of this analyzer (for logging)
    fn name(&self) -> &'static str;
}
