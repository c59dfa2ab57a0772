//! CLI argument parsing and configuration

use super::settings::{FailurePolicy, OrderingKind, TempoBackend};
use clap::Parser;
use std::path::PathBuf;

/// audio2h - Pack a folder of loops into a C header for the sampler firmware
///
/// Converts each input to tempo-normalized 8-bit mono with sox, then writes
/// every sample byte into one flash array with offset/length/beat constants.
#[derive(Parser, Debug)]
#[command(name = "audio2h")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// File with one input path per line (disables the folder scan)
    #[arg(long, value_name = "PATH")]
    pub list: Option<PathBuf>,

    /// Folder scanned recursively for audio files
    #[arg(long, value_name = "DIR", default_value = "flacs")]
    pub folder_in: PathBuf,

    /// Folder for converted WAV files (wiped on every run)
    #[arg(long, value_name = "DIR", default_value = "converted")]
    pub folder_out: PathBuf,

    /// Maximum number of files to process
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub limit: usize,

    /// Target tempo every file is stretched to
    #[arg(long, value_name = "BPM", default_value_t = 165.0)]
    pub bpm: f64,

    /// Target sample rate in Hz
    #[arg(long, value_name = "HZ", default_value_t = 33000.0)]
    pub sr: f64,

    /// Ignore the ordering manifest even when manifest ordering is selected
    #[arg(long, default_value = "false")]
    pub ignore_filelist: bool,

    /// How units are ordered in the header
    #[arg(long, value_enum, default_value_t = OrderingKind::Discovery)]
    pub order: OrderingKind,

    /// Ordering manifest (whitespace-separated file name tokens)
    #[arg(long, value_name = "PATH", default_value = "jsons/filelist2.txt")]
    pub manifest: PathBuf,

    /// What to do with units whose conversion or decoding failed
    #[arg(long, value_enum, default_value_t = FailurePolicy::Skip)]
    pub on_failure: FailurePolicy,

    /// Tempo analysis backend
    #[arg(long, value_enum, default_value_t = TempoBackend::Hinted)]
    pub tempo_backend: TempoBackend,

    /// sox binary used for conversion
    #[arg(long, value_name = "PATH", default_value = "sox")]
    pub sox: PathBuf,

    /// Destination of the generated header
    #[arg(long, value_name = "PATH", default_value = "../doth/audio2h.h")]
    pub header_out: PathBuf,

    /// Destination of the JSON snapshot
    #[arg(long, value_name = "PATH", default_value = "files.json")]
    pub json_out: PathBuf,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - show files and sox commands without processing
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log filter based on verbosity flags
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["audio2h"]);
        assert_eq!(cli.list, None);
        assert_eq!(cli.folder_in, PathBuf::from("flacs"));
        assert_eq!(cli.folder_out, PathBuf::from("converted"));
        assert_eq!(cli.limit, 100);
        assert_eq!(cli.bpm, 165.0);
        assert_eq!(cli.sr, 33000.0);
        assert!(!cli.ignore_filelist);
        assert_eq!(cli.order, OrderingKind::Discovery);
        assert_eq!(cli.on_failure, FailurePolicy::Skip);
        assert_eq!(cli.header_out, PathBuf::from("../doth/audio2h.h"));
        assert_eq!(cli.json_out, PathBuf::from("files.json"));
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "audio2h",
            "--list",
            "inputs.txt",
            "--limit",
            "4",
            "--bpm",
            "120.5",
            "--sr",
            "22050",
            "--order",
            "manifest",
            "--on-failure",
            "placeholder",
            "--tempo-backend",
            "stratum",
            "-vv",
        ]);
        assert_eq!(cli.list, Some(PathBuf::from("inputs.txt")));
        assert_eq!(cli.limit, 4);
        assert_eq!(cli.bpm, 120.5);
        assert_eq!(cli.sr, 22050.0);
        assert_eq!(cli.order, OrderingKind::Manifest);
        assert_eq!(cli.on_failure, FailurePolicy::Placeholder);
        assert_eq!(cli.tempo_backend, TempoBackend::Stratum);
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["audio2h", "-vvv", "-q"]);
        assert_eq!(cli.log_filter(), "error");
    }
}
