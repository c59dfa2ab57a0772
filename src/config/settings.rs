//! Runtime configuration settings

use crate::error::{Audio2hError, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// Ordering strategy for units in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderingKind {
    /// Keep discovery order
    Discovery,
    /// Rank by position in the ordering manifest
    Manifest,
}

/// What the emitter does with units that failed conversion or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Leave failed units out of the header
    Skip,
    /// Keep failed units as one beat of silence
    Placeholder,
}

/// Tempo analysis backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TempoBackend {
    /// File name hints, falling back to detection
    Hinted,
    /// Always detect from the decoded audio
    Stratum,
}

/// Runtime settings for the conversion pipeline
///
/// Built once at startup and passed by reference to every stage.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Explicit input list (disables folder scan)
    pub list: Option<PathBuf>,
    /// Folder scanned for inputs
    pub folder_in: PathBuf,
    /// Folder for converted WAV files
    pub folder_out: PathBuf,
    /// Maximum number of processed files
    pub limit: usize,
    /// Target tempo
    pub target_bpm: f64,
    /// Target sample rate in Hz
    pub target_sample_rate: f64,
    /// Ordering strategy
    pub ordering: OrderingKind,
    /// Ordering manifest path, `None` when the manifest is ignored
    pub manifest: Option<PathBuf>,
    /// Failed-unit policy
    pub failure_policy: FailurePolicy,
    /// Tempo analysis backend
    pub tempo_backend: TempoBackend,
    /// sox binary
    pub sox_binary: PathBuf,
    /// Generated header destination
    pub header_path: PathBuf,
    /// JSON snapshot destination
    pub json_path: PathBuf,
    /// Show progress bar
    pub show_progress: bool,
    /// Dry run mode - show plan without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let list = cli
            .list
            .clone()
            .filter(|p| !p.as_os_str().is_empty());

        Self {
            list,
            folder_in: cli.folder_in.clone(),
            folder_out: cli.folder_out.clone(),
            limit: cli.limit,
            target_bpm: cli.bpm,
            target_sample_rate: cli.sr,
            ordering: cli.order,
            manifest: if cli.ignore_filelist {
                None
            } else {
                Some(cli.manifest.clone())
            },
            failure_policy: cli.on_failure,
            tempo_backend: cli.tempo_backend,
            sox_binary: cli.sox.clone(),
            header_path: cli.header_out.clone(),
            json_path: cli.json_out.clone(),
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// Reject values the header math cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.target_bpm.is_finite() && self.target_bpm > 0.0) {
            return Err(Audio2hError::ConfigError(format!(
                "target BPM must be a positive number, got {}",
                self.target_bpm
            )));
        }
        if !(self.target_sample_rate.is_finite() && self.target_sample_rate >= 1.0) {
            return Err(Audio2hError::ConfigError(format!(
                "target sample rate must be at least 1 Hz, got {}",
                self.target_sample_rate
            )));
        }
        Ok(())
    }

    /// Target sample rate as passed to sox and written to the header
    pub fn sample_rate_hz(&self) -> u32 {
        self.target_sample_rate as u32
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            list: None,
            folder_in: PathBuf::from("flacs"),
            folder_out: PathBuf::from("converted"),
            limit: 100,
            target_bpm: 165.0,
            target_sample_rate: 33000.0,
            ordering: OrderingKind::Discovery,
            manifest: Some(PathBuf::from("jsons/filelist2.txt")),
            failure_policy: FailurePolicy::Skip,
            tempo_backend: TempoBackend::Hinted,
            sox_binary: PathBuf::from("sox"),
            header_path: PathBuf::from("../doth/audio2h.h"),
            json_path: PathBuf::from("files.json"),
            show_progress: true,
            dry_run: false,
        }
    }
}
