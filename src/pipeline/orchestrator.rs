//! Pipeline orchestration
//!
//! Runs discovery, conversion, decoding, ordering and export one after
//! another. Per-unit failures are collected as outcomes; only fatal errors
//! abort the run.

use super::ordering::{apply_ordering, build_ordering};
use crate::analysis::{build_analyzer, TempoAnalyzer};
use crate::audio::{self, AudioConverter, ConversionJob, SoxConverter};
use crate::config::Settings;
use crate::discovery;
use crate::error::Result;
use crate::export;
use crate::types::{AudioUnit, UnitOutcome};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline result summary
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Units discovered (after the limit)
    pub total_files: usize,
    /// Units converted and decoded
    pub converted: usize,
    /// Units that failed conversion or decoding
    pub failed: usize,
    /// Blocks written to the header, excluding the dummy
    pub emitted: usize,
}

/// Run the full pipeline with the backends selected in `settings`
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    settings.validate()?;

    let analyzer = build_analyzer(settings);
    let converter = SoxConverter::new(&settings.sox_binary);

    run_with(settings, analyzer.as_ref(), &converter)
}

/// Run the full pipeline with explicit backends
pub fn run_with(
    settings: &Settings,
    analyzer: &dyn TempoAnalyzer,
    converter: &dyn AudioConverter,
) -> Result<PipelineResult> {
    settings.validate()?;

    let pipeline_start = Instant::now();

    // Phase 1: Discovery and tempo analysis
    let discovery_start = Instant::now();
    info!("Scanning for audio files...");
    let units = discovery::discover(settings, analyzer)?;
    info!(
        "Found {} audio files in {:.2}s (tempo via {})",
        units.len(),
        discovery_start.elapsed().as_secs_f64(),
        analyzer.name()
    );

    if settings.dry_run {
        return run_dry_run(&units, settings);
    }

    // Phase 2: Conversion
    let conversion_start = Instant::now();
    let conversions = audio::convert_all(&units, settings, converter)?;
    info!(
        "Conversion finished in {:.2}s",
        conversion_start.elapsed().as_secs_f64()
    );

    // Phase 3: Decoding
    let mut outcomes = decode_converted(units, conversions);

    // Phase 4: Ordering
    let ordering = build_ordering(settings);
    apply_ordering(&mut outcomes, ordering.as_ref());

    // Phase 5: Export
    let export_start = Instant::now();
    let emitted = export::emit(&outcomes, settings)?;
    debug!(
        "Export finished in {:.2}s",
        export_start.elapsed().as_secs_f64()
    );

    let converted = outcomes.iter().filter(|o| o.is_ok()).count();
    let result = PipelineResult {
        total_files: outcomes.len(),
        converted,
        failed: outcomes.len() - converted,
        emitted,
    };

    info!(
        "Pipeline complete in {:.2}s: {} converted, {} failed, {} emitted",
        pipeline_start.elapsed().as_secs_f64(),
        result.converted,
        result.failed,
        result.emitted
    );

    Ok(result)
}

/// Pair each unit with its conversion result and decode the converted WAV
///
/// Units whose conversion failed are not decoded.
fn decode_converted(units: Vec<AudioUnit>, conversions: Vec<Result<()>>) -> Vec<UnitOutcome> {
    units
        .into_iter()
        .zip(conversions)
        .map(|(unit, conversion)| match conversion {
            Err(e) => UnitOutcome::Failed {
                unit,
                reason: e.to_string(),
            },
            Ok(()) => match audio::decode_wav_u8(&unit.converted_path) {
                Ok(samples) => {
                    debug!("Decoded {} samples from {}", samples.len(), unit.converted_name());
                    UnitOutcome::Ok { unit, samples }
                }
                Err(e) => {
                    warn!("{}", e);
                    UnitOutcome::Failed {
                        unit,
                        reason: e.to_string(),
                    }
                }
            },
        })
        .collect()
}

/// Print what a run would do, without touching the filesystem
fn run_dry_run(units: &[AudioUnit], settings: &Settings) -> Result<PipelineResult> {
    let sox = SoxConverter::new(&settings.sox_binary);

    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    for unit in units {
        println!(
            "{:>3}  {}  ({:.2} BPM, {} beats, {:.2}s)",
            unit.order,
            unit.source_path.display(),
            unit.source_bpm,
            unit.beat_count,
            unit.duration_seconds
        );
        match ConversionJob::for_unit(unit, settings) {
            Ok(job) => println!("     {}", sox.command_line(&job)),
            Err(e) => println!("     skipped: {}", e),
        }
    }

    println!();
    println!("─────────────────────────────────────────");
    println!();
    println!("Would convert {} files into {}", units.len(), settings.folder_out.display());
    println!("Would create:");
    println!("  {}", settings.header_path.display());
    println!("  {}", settings.json_path.display());
    println!();

    Ok(PipelineResult {
        total_files: units.len(),
        ..PipelineResult::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::error::Audio2hError;
    use crate::types::{TempoResult, TempoSource};
    use std::path::Path;
    use tempfile::TempDir;

    struct FixedTempo;

    impl TempoAnalyzer for FixedTempo {
        fn analyze(&self, _path: &Path) -> Result<TempoResult> {
            Ok(TempoResult {
                bpm: 150.0,
                beats: 4.0,
                duration_seconds: 1.6,
                source: TempoSource::Detected,
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct NeverConverts;

    impl AudioConverter for NeverConverts {
        fn convert(&self, job: &ConversionJob) -> Result<()> {
            Err(Audio2hError::conversion_error(&job.source, "not available"))
        }

        fn name(&self) -> &'static str {
            "never"
        }
    }

    /// Reports success but leaves an unreadable file behind
    struct WritesGarbage;

    impl AudioConverter for WritesGarbage {
        fn convert(&self, job: &ConversionJob) -> Result<()> {
            std::fs::write(&job.destination, b"RIFF\x00\x00garbage")?;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "garbage"
        }
    }

    fn settings_in(dir: &TempDir) -> Settings {
        let folder_in = dir.path().join("flacs");
        std::fs::create_dir_all(&folder_in).unwrap();
        std::fs::write(folder_in.join("a.wav"), b"").unwrap();
        std::fs::write(folder_in.join("b.flac"), b"").unwrap();

        Settings {
            folder_in,
            folder_out: dir.path().join("converted"),
            header_path: dir.path().join("doth").join("audio2h.h"),
            json_path: dir.path().join("files.json"),
            show_progress: false,
            ..Settings::default()
        }
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            dry_run: true,
            ..settings_in(&dir)
        };

        let result = run_with(&settings, &FixedTempo, &NeverConverts).unwrap();

        assert_eq!(result.total_files, 2);
        assert_eq!(result.converted, 0);
        assert!(!settings.folder_out.exists());
        assert!(!settings.header_path.exists());
        assert!(!settings.json_path.exists());
    }

    #[test]
    fn test_failed_conversions_still_emit_header() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        let result = run_with(&settings, &FixedTempo, &NeverConverts).unwrap();

        assert_eq!(result.total_files, 2);
        assert_eq!(result.failed, 2);
        assert_eq!(result.emitted, 0);
        let text = std::fs::read_to_string(&settings.header_path).unwrap();
        assert!(text.contains("#define NUM_SAMPLES 0"));
        assert!(settings.json_path.exists());
    }

    #[test]
    fn test_undecodable_output_is_skipped() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        let result = run_with(&settings, &FixedTempo, &WritesGarbage).unwrap();

        assert_eq!(result.converted, 0);
        assert_eq!(result.failed, 2);
        assert_eq!(result.emitted, 0);
        let snapshot = export::read_json(&settings.json_path).unwrap();
        assert!(snapshot.files.iter().all(|f| f.status == "failed"));
        assert!(snapshot.files[0].error.as_deref().unwrap().contains("Failed to decode"));
    }

    #[test]
    fn test_undecodable_output_becomes_placeholder() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            failure_policy: FailurePolicy::Placeholder,
            ..settings_in(&dir)
        };

        let result = run_with(&settings, &FixedTempo, &WritesGarbage).unwrap();

        assert_eq!(result.failed, 2);
        assert_eq!(result.emitted, 2);
        let text = std::fs::read_to_string(&settings.header_path).unwrap();
        assert!(text.contains("#define RAW_0_SAMPLES 12000"));
        assert!(text.contains("#define RAW_0_BEATS 2"));
        assert!(text.contains("#define RAW_1_START 143072"));
    }

    #[test]
    fn test_invalid_settings_are_fatal() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            target_bpm: 0.0,
            ..settings_in(&dir)
        };

        let err = run_with(&settings, &FixedTempo, &NeverConverts).unwrap_err();
        assert!(matches!(err, Audio2hError::ConfigError(_)));
        assert!(!err.is_recoverable());
    }
}
