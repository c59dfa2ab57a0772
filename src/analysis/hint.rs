//! Tempo from file name conventions
//!
//! Loop libraries usually carry the tempo in the file name, e.g.
//! `cold_sweat_bpm150_beats16.flac` or `amen_5c063f57_beats8_bpm146.flac`.
//! Those hints win over detection; files without a BPM hint go to the
//! fallback analyzer, or get a tempo guessed from their duration.

use crate::analysis::traits::TempoAnalyzer;
use crate::audio;
use crate::error::{Audio2hError, Result};
use crate::types::{TempoResult, TempoSource};
use std::path::Path;
use tracing::debug;

/// Tempo range searched when guessing from duration alone
const GUESS_BPM_RANGE: std::ops::RangeInclusive<u32> = 100..=200;

/// `bpm<N>` / `beats<N>` tokens parsed from a file stem
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilenameHints {
    pub bpm: Option<f64>,
    pub beats: Option<f64>,
}

impl FilenameHints {
    /// Parse hints from the stem of `path`
    ///
    /// Tokens are separated by `_`, `-` or spaces and matched
    /// case-insensitively. Both `bpm150` and `150bpm` are accepted.
    pub fn parse(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut hints = FilenameHints::default();
        for token in stem.split(['_', '-', ' ']) {
            if let Some(value) = tagged_number(token, "bpm") {
                hints.bpm = Some(value);
            } else if let Some(value) = tagged_number(token, "beats") {
                hints.beats = Some(value);
            }
        }
        hints
    }
}

fn tagged_number(token: &str, tag: &str) -> Option<f64> {
    let digits = token
        .strip_prefix(tag)
        .or_else(|| token.strip_suffix(tag))?;
    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Number of whole beats in `duration_seconds` at `bpm`
pub fn beats_in(duration_seconds: f64, bpm: f64) -> f64 {
    (duration_seconds * bpm / 60.0).round()
}

/// Guess a tempo from duration alone
///
/// Picks the integer BPM in 100..=200 whose implied beat count is closest to
/// a whole number. Returns `None` for a non-positive duration.
pub fn guess_from_duration(duration_seconds: f64) -> Option<TempoResult> {
    if !(duration_seconds.is_finite() && duration_seconds > 0.0) {
        return None;
    }

    let mut best: Option<(f64, f64)> = None;
    for bpm in GUESS_BPM_RANGE {
        let bpm = bpm as f64;
        let beats = duration_seconds * bpm / 60.0;
        let error = (beats - beats.round()).abs();
        if best.map_or(true, |(_, best_error)| error < best_error) {
            best = Some((bpm, error));
        }
    }

    best.map(|(bpm, _)| TempoResult {
        bpm,
        beats: beats_in(duration_seconds, bpm),
        duration_seconds,
        source: TempoSource::DurationGuess,
    })
}

/// Analyzer that trusts file name hints
pub struct FilenameTempoAnalyzer {
    fallback: Option<Box<dyn TempoAnalyzer>>,
}

impl FilenameTempoAnalyzer {
    /// Hints only; files without a BPM hint get a duration-based guess
    pub fn new() -> Self {
        Self { fallback: None }
    }

    /// Hints first, `fallback` for files without a BPM hint
    ///
    /// A failing fallback still ends in the duration guess.
    pub fn with_fallback(fallback: Box<dyn TempoAnalyzer>) -> Self {
        Self {
            fallback: Some(fallback),
        }
    }
}

impl Default for FilenameTempoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoAnalyzer for FilenameTempoAnalyzer {
    fn analyze(&self, path: &Path) -> Result<TempoResult> {
        let hints = FilenameHints::parse(path);

        if let Some(bpm) = hints.bpm {
            let duration_seconds = match (audio::probe_duration(path), hints.beats) {
                (Ok(duration), _) => duration,
                // Both hints present: the duration follows from them
                (Err(_), Some(beats)) => beats * 60.0 / bpm,
                (Err(e), None) => return Err(e),
            };
            let beats = hints
                .beats
                .unwrap_or_else(|| beats_in(duration_seconds, bpm));

            return Ok(TempoResult {
                bpm,
                beats,
                duration_seconds,
                source: TempoSource::FilenameHint,
            });
        }

        if let Some(fallback) = &self.fallback {
            debug!(
                "No BPM hint in {}, using {}",
                path.display(),
                fallback.name()
            );
            match fallback.analyze(path) {
                Ok(result) => return Ok(result),
                Err(e) => debug!("{} failed, guessing from duration: {}", fallback.name(), e),
            }
        }

        let duration_seconds = audio::probe_duration(path)?;
        guess_from_duration(duration_seconds).ok_or_else(|| {
            Audio2hError::analysis_error(path, "File has no duration to guess a tempo from")
        })
    }

    fn name(&self) -> &'static str {
        "filename"
    }
}
