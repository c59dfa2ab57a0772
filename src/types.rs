//! Core data types for audio2h
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Tempo analysis results
// =============================================================================

/// Where a tempo value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoSource {
    /// Parsed from `bpm<N>` / `beats<N>` tokens in the file name
    FilenameHint,
    /// Guessed from the duration alone
    DurationGuess,
    /// Detected from the decoded audio
    Detected,
}

/// Tempo analysis result for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoResult {
    /// Tempo of the source in beats per minute
    pub bpm: f64,
    /// Number of beats in the whole file
    pub beats: f64,
    /// Duration of the source in seconds
    pub duration_seconds: f64,
    pub source: TempoSource,
}

// =============================================================================
// Unit representation
// =============================================================================

/// Metadata extracted from audio file tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// One input audio file through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioUnit {
    /// Original input file
    pub source_path: PathBuf,
    /// Resampled intermediate WAV written by the converter
    pub converted_path: PathBuf,
    /// Beats detected in the source
    pub beat_count: f64,
    /// Detected tempo of the source
    pub source_bpm: f64,
    /// Duration of the source in seconds
    pub duration_seconds: f64,
    /// Emission order (discovery index until an ordering strategy runs)
    pub order: usize,
    /// How the tempo fields were filled in, if analysis succeeded
    pub tempo_source: Option<TempoSource>,
    /// Tag metadata from the source file
    pub metadata: UnitMetadata,
}

impl AudioUnit {
    /// Create a unit for `source_path` whose converted file lands in `folder_out`
    ///
    /// Tempo fields start at zero until the analyzer fills them in.
    pub fn new(source_path: PathBuf, folder_out: &Path, order: usize) -> Self {
        let converted_path = converted_path_for(&source_path, folder_out);
        Self {
            source_path,
            converted_path,
            beat_count: 0.0,
            source_bpm: 0.0,
            duration_seconds: 0.0,
            order,
            tempo_source: None,
            metadata: UnitMetadata::default(),
        }
    }

    /// Apply an analyzer result to this unit
    pub fn apply_tempo(&mut self, tempo: &TempoResult) {
        self.beat_count = tempo.beats;
        self.source_bpm = tempo.bpm;
        self.duration_seconds = tempo.duration_seconds;
        self.tempo_source = Some(tempo.source);
    }

    /// Whether the detected tempo can be used as a stretch denominator
    pub fn has_usable_tempo(&self) -> bool {
        self.source_bpm.is_finite() && self.source_bpm > 0.0
    }

    /// File name of the source, used in header comments and logs
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source_path.to_string_lossy().to_string())
    }

    /// File name of the converted WAV, used for manifest matching
    pub fn converted_name(&self) -> String {
        self.converted_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// `{folder_out}/{basename(source)}.wav`
///
/// The full source file name is kept, so `kick.flac` becomes `kick.flac.wav`.
pub fn converted_path_for(source: &Path, folder_out: &Path) -> PathBuf {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    folder_out.join(format!("{}.wav", base))
}

// =============================================================================
// Per-unit outcomes
// =============================================================================

/// Result of taking one unit through conversion and decoding
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    /// Converted and decoded
    Ok { unit: AudioUnit, samples: Vec<u8> },
    /// Some stage failed; the reason is kept for the report
    Failed { unit: AudioUnit, reason: String },
}

impl UnitOutcome {
    pub fn unit(&self) -> &AudioUnit {
        match self {
            UnitOutcome::Ok { unit, .. } | UnitOutcome::Failed { unit, .. } => unit,
        }
    }

    pub fn unit_mut(&mut self) -> &mut AudioUnit {
        match self {
            UnitOutcome::Ok { unit, .. } | UnitOutcome::Failed { unit, .. } => unit,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, UnitOutcome::Ok { .. })
    }

    /// Failure reason, if any
    pub fn failure(&self) -> Option<&str> {
        match self {
            UnitOutcome::Ok { .. } => None,
            UnitOutcome::Failed { reason, .. } => Some(reason),
        }
    }
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded audio samples ready for tempo detection
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats picked up by a folder scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Flac,
    Wav,
    Mp3,
    Aif,
    Ogg,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "flac" => Some(AudioFormat::Flac),
            "wav" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            "aif" => Some(AudioFormat::Aif),
            "ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
