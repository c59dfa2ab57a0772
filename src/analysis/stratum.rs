//! Stratum-DSP based tempo detection
//!
//! Used for files whose name carries no tempo hint. Decodes the source with
//! symphonia and runs the stratum-dsp tempo analysis on the mono signal.

use crate::analysis::hint::beats_in;
use crate::analysis::traits::TempoAnalyzer;
use crate::audio;
use crate::error::{Audio2hError, Result};
use crate::types::{TempoResult, TempoSource};
use std::path::Path;
use stratum_dsp::{analyze_audio, AnalysisConfig};
use tracing::debug;

/// Minimum audio duration in seconds required for reliable detection
/// stratum-dsp needs at least 3-5 seconds for BPM detection
const MIN_AUDIO_DURATION_SECS: f64 = 3.0;

/// Tempo analyzer using stratum-dsp
///
/// Uses autocorrelation and comb filterbank analysis for tempo detection.
pub struct StratumTempoAnalyzer;

impl StratumTempoAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StratumTempoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoAnalyzer for StratumTempoAnalyzer {
    fn analyze(&self, path: &Path) -> Result<TempoResult> {
        let buffer = audio::decode(path)?;

        if buffer.duration < MIN_AUDIO_DURATION_SECS {
            return Err(Audio2hError::analysis_error(
                path,
                format!(
                    "Audio too short ({:.1}s). Minimum {:.0}s required for tempo detection",
                    buffer.duration, MIN_AUDIO_DURATION_SECS
                ),
            ));
        }

        debug!(
            "Analyzing BPM with stratum-dsp ({} samples, {}Hz)",
            buffer.len(),
            buffer.sample_rate
        );

        let result = analyze_audio(&buffer.samples, buffer.sample_rate, AnalysisConfig::default())
            .map_err(|e| Audio2hError::analysis_error(path, format!("BPM analysis failed: {}", e)))?;

        let bpm = result.bpm as f64;
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(Audio2hError::analysis_error(path, "No tempo detected"));
        }

        debug!(
            "Detected BPM: {:.2} (confidence: {:.2})",
            bpm, result.bpm_confidence
        );

        Ok(TempoResult {
            bpm,
            beats: beats_in(buffer.duration, bpm),
            duration_seconds: buffer.duration,
            source: TempoSource::Detected,
        })
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}
