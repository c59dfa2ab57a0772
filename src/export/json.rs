//! JSON snapshot of a run (`files.json`)

use crate::config::Settings;
use crate::error::{Audio2hError, Result};
use crate::types::{TempoSource, UnitMetadata, UnitOutcome};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct FilesJson {
    /// Schema version for forward compatibility
    pub version: String,
    pub metadata: ExportMetadata,
    /// Units in emission order
    pub files: Vec<UnitJson>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// audio2h version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    pub target_bpm: f64,
    pub target_sample_rate: f64,
    pub file_count: usize,
}

/// One unit as recorded in the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitJson {
    pub source_path: String,
    pub converted_path: String,
    pub beats: f64,
    pub bpm: f64,
    pub seconds: f64,
    pub order: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_source: Option<TempoSource>,
    pub metadata: UnitMetadata,
    /// `"ok"` or `"failed"`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Write the snapshot for `outcomes` to `settings.json_path`
///
/// Written to a temp file next to the target, then renamed into place.
pub fn write_json(outcomes: &[UnitOutcome], settings: &Settings) -> Result<()> {
    let output_path = settings.json_path.as_path();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Audio2hError::output_error(parent, e))?;
    }

    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| Audio2hError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let writer = BufWriter::new(file);

    let output = FilesJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            target_bpm: settings.target_bpm,
            target_sample_rate: settings.target_sample_rate,
            file_count: outcomes.len(),
        },
        files: outcomes.iter().map(outcome_to_json).collect(),
    };

    serde_json::to_writer_pretty(writer, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        Audio2hError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        Audio2hError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote {} units to {}", outcomes.len(), output_path.display());

    Ok(())
}

fn outcome_to_json(outcome: &UnitOutcome) -> UnitJson {
    let unit = outcome.unit();
    UnitJson {
        source_path: unit.source_path.to_string_lossy().to_string(),
        converted_path: unit.converted_path.to_string_lossy().to_string(),
        beats: unit.beat_count,
        bpm: unit.source_bpm,
        seconds: unit.duration_seconds,
        order: unit.order,
        tempo_source: unit.tempo_source,
        metadata: unit.metadata.clone(),
        status: if outcome.is_ok() { "ok" } else { "failed" }.to_string(),
        error: outcome.failure().map(str::to_string),
    }
}

/// Read a snapshot back
pub fn read_json(path: &Path) -> Result<FilesJson> {
    if !path.exists() {
        return Err(Audio2hError::FileNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        Audio2hError::ConfigError(format!("Invalid snapshot {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AudioUnit, TempoResult};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_outcomes() -> Vec<UnitOutcome> {
        let mut ok = AudioUnit::new(PathBuf::from("flacs/amen_bpm146.flac"), Path::new("converted"), 0);
        ok.apply_tempo(&TempoResult {
            bpm: 146.0,
            beats: 8.0,
            duration_seconds: 3.288,
            source: TempoSource::FilenameHint,
        });
        ok.metadata.title = Some("Amen".to_string());

        let failed = AudioUnit::new(PathBuf::from("flacs/noise.wav"), Path::new("converted"), 1);

        vec![
            UnitOutcome::Ok {
                unit: ok,
                samples: vec![0x80; 16],
            },
            UnitOutcome::Failed {
                unit: failed,
                reason: "no usable tempo".to_string(),
            },
        ]
    }

    #[test]
    fn test_write_and_read_snapshot() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            json_path: dir.path().join("out").join("files.json"),
            ..Settings::default()
        };

        write_json(&sample_outcomes(), &settings).unwrap();

        let snapshot = read_json(&settings.json_path).unwrap();
        assert_eq!(snapshot.version, SCHEMA_VERSION);
        assert_eq!(snapshot.metadata.file_count, 2);
        assert_eq!(snapshot.metadata.target_bpm, 165.0);
        assert_eq!(snapshot.metadata.target_sample_rate, 33000.0);

        let amen = &snapshot.files[0];
        assert_eq!(amen.status, "ok");
        assert_eq!(amen.bpm, 146.0);
        assert_eq!(amen.beats, 8.0);
        assert_eq!(amen.tempo_source, Some(TempoSource::FilenameHint));
        assert_eq!(amen.metadata.title.as_deref(), Some("Amen"));
        assert!(amen.error.is_none());

        let noise = &snapshot.files[1];
        assert_eq!(noise.status, "failed");
        assert_eq!(noise.order, 1);
        assert_eq!(noise.error.as_deref(), Some("no usable tempo"));

        assert!(!settings.json_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_status_omits_tempo_source() {
        let text = serde_json::to_string(&outcome_to_json(&sample_outcomes()[1])).unwrap();
        assert!(!text.contains("tempo_source"));
        assert!(text.contains("\"status\":\"failed\""));
    }

    #[test]
    fn test_read_missing_snapshot() {
        let err = read_json(Path::new("/no/such/files.json")).unwrap_err();
        assert!(matches!(err, Audio2hError::FileNotFound(_)));
    }
}
