//! Per-file conversion to tempo-normalized 8-bit mono WAV
//!
//! The production backend shells out to sox. Every call blocks until the
//! child exits; files are converted one after another.

use crate::config::Settings;
use crate::error::{Audio2hError, Result};
use crate::types::AudioUnit;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info, trace};

/// Upper bound for the low-pass cutoff in Hz
const MAX_LOWPASS_HZ: i64 = 19000;

/// Fixed high-pass cutoff in Hz, removes DC offset before 8-bit quantization
const HIGHPASS_HZ: u32 = 5;

/// Low-pass cutoff for a target sample rate: `min(19000, floor(sr * 7/16) - 5)`
pub fn lowpass_cutoff(sample_rate: f64) -> i64 {
    ((sample_rate * 7.0 / 16.0) as i64 - 5).min(MAX_LOWPASS_HZ)
}

/// Everything needed to convert one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// `target_bpm / source_bpm`
    pub stretch: f64,
    /// Low-pass cutoff in Hz
    pub lowpass_hz: i64,
}

impl ConversionJob {
    /// Build the job for `unit`
    ///
    /// Fails when the unit has no usable tempo, since the stretch ratio
    /// would divide by zero.
    pub fn for_unit(unit: &AudioUnit, settings: &Settings) -> Result<Self> {
        if !unit.has_usable_tempo() {
            return Err(Audio2hError::conversion_error(
                &unit.source_path,
                format!(
                    "No usable source tempo ({}), cannot compute stretch ratio",
                    unit.source_bpm
                ),
            ));
        }

        Ok(Self {
            source: unit.source_path.clone(),
            destination: unit.converted_path.clone(),
            sample_rate: settings.sample_rate_hz(),
            stretch: settings.target_bpm / unit.source_bpm,
            lowpass_hz: lowpass_cutoff(settings.target_sample_rate),
        })
    }

    /// sox argument list, in the order the effects chain must run
    pub fn sox_args(&self) -> Vec<OsString> {
        let rate = self.sample_rate.to_string();
        let mut args: Vec<OsString> = vec![self.source.clone().into_os_string()];
        args.extend(
            ["-r", rate.as_str(), "-c", "1", "-b", "8"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(self.destination.clone().into_os_string());
        args.extend(
            [
                "speed".to_string(),
                format!("{:.6}", self.stretch),
                "highpass".to_string(),
                HIGHPASS_HZ.to_string(),
                "lowpass".to_string(),
                self.lowpass_hz.to_string(),
                "gain".to_string(),
                "-6".to_string(),
                "norm".to_string(),
                "-3".to_string(),
                "dither".to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args
    }
}

/// Conversion backend
pub trait AudioConverter {
    /// Convert `job.source` into `job.destination`
    fn convert(&self, job: &ConversionJob) -> Result<()>;

    /// Get the name of this converter (for logging)
    fn name(&self) -> &'static str;
}

/// Converter that runs the sox binary
pub struct SoxConverter {
    binary: PathBuf,
}

impl SoxConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full command line, for logging and dry runs
    pub fn command_line(&self, job: &ConversionJob) -> String {
        std::iter::once(self.binary.clone().into_os_string())
            .chain(job.sox_args())
            .map(|a| a.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for SoxConverter {
    fn default() -> Self {
        Self::new("sox")
    }
}

impl AudioConverter for SoxConverter {
    fn convert(&self, job: &ConversionJob) -> Result<()> {
        trace!("{}", self.command_line(job));

        let output = Command::new(&self.binary)
            .args(job.sox_args())
            .output()
            .map_err(|e| {
                Audio2hError::conversion_error(
                    &job.source,
                    format!(
                        "Failed to run {}: {}\n  Tip: Install sox or pass --sox /path/to/sox",
                        self.binary.display(),
                        e
                    ),
                )
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Audio2hError::conversion_error(
                &job.source,
                format!("sox exited with {}: {}", output.status, combined.trim()),
            ));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "sox"
    }
}

/// Delete and recreate the output folder
///
/// Anything already in the folder is lost.
pub fn prepare_output_folder(folder: &Path) -> Result<()> {
    if folder.exists() {
        debug!("Removing previous output folder {}", folder.display());
        std::fs::remove_dir_all(folder).map_err(|e| Audio2hError::output_error(folder, e))?;
    }
    std::fs::create_dir_all(folder).map_err(|e| Audio2hError::output_error(folder, e))?;
    Ok(())
}

/// Convert every unit in order, logging and continuing past failures
///
/// Returns one result per unit, aligned with `units`. Only output-folder
/// setup is fatal.
pub fn convert_all(
    units: &[AudioUnit],
    settings: &Settings,
    converter: &dyn AudioConverter,
) -> Result<Vec<Result<()>>> {
    prepare_output_folder(&settings.folder_out)?;

    info!(
        "Converting {} files with {} ({} Hz, {} BPM, lowpass {} Hz)",
        units.len(),
        converter.name(),
        settings.sample_rate_hz(),
        settings.target_bpm,
        lowpass_cutoff(settings.target_sample_rate)
    );

    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(units.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut results = Vec::with_capacity(units.len());

    for unit in units {
        if let Some(ref pb) = progress_bar {
            pb.set_message(unit.file_name());
        }

        let result = ConversionJob::for_unit(unit, settings).and_then(|job| {
            debug!(
                "Converting {} (stretch {:.6})",
                unit.file_name(),
                job.stretch
            );
            converter.convert(&job)
        });

        if let Err(ref e) = result {
            error!("{}", e);
        }
        results.push(result);

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Conversion complete");
    }

    Ok(results)
}
