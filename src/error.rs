//! Unified error types for audio2h
//!
//! Error strategy:
//! - Per-unit errors (analysis, conversion, decode): Recoverable, log and continue
//! - System errors (discovery, output folder, header output): Fatal, abort run
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Input formats picked up by a folder scan, for helpful error messages
pub const SUPPORTED_FORMATS: &str = "FLAC, WAV, MP3, AIF, OGG";

/// Top-level error type for audio2h operations
#[derive(Debug, Error)]
pub enum Audio2hError {
    // =========================================================================
    // Recoverable errors - mark unit failed, continue run
    // =========================================================================
    #[error("Failed to decode '{path}': {reason}\n  Tip: The converted file may be missing if sox failed for this input")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Tempo analysis failed for '{path}': {reason}\n  Tip: Add a hint to the filename, e.g. 'loop_bpm150_beats16.flac'")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("Conversion failed for '{path}': {reason}")]
    ConversionError { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort the run before any header is written
    // =========================================================================
    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output location")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for audio2h operations
pub type Result<T> = std::result::Result<T, Audio2hError>;

impl Audio2hError {
    /// Returns true if this error only affects a single unit
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Audio2hError::DecodeError { .. }
                | Audio2hError::UnsupportedFormat { .. }
                | Audio2hError::AnalysisError { .. }
                | Audio2hError::ConversionError { .. }
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Audio2hError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an analysis error with context about the issue
    pub fn analysis_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Audio2hError::AnalysisError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a conversion error with context about the issue
    pub fn conversion_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Audio2hError::ConversionError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent().map(|p| p.display().to_string()).unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        Audio2hError::OutputError { path, reason }
    }
}
