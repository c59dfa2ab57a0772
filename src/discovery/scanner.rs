//! File discovery and scanning

use crate::analysis::{metadata, TempoAnalyzer};
use crate::config::Settings;
use crate::error::{Audio2hError, Result};
use crate::types::{AudioFormat, AudioUnit};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Resolve input paths and build one analyzed unit per path
///
/// Paths beyond `settings.limit` are dropped before analysis. An analyzer
/// failure leaves the unit's tempo fields at zero.
pub fn discover(settings: &Settings, analyzer: &dyn TempoAnalyzer) -> Result<Vec<AudioUnit>> {
    let mut paths = scan_inputs(settings)?;

    if paths.len() > settings.limit {
        debug!(
            "Limiting {} discovered files to {}",
            paths.len(),
            settings.limit
        );
        paths.truncate(settings.limit);
    }

    debug!("Folder out: {}", settings.folder_out.display());

    let units: Vec<AudioUnit> = paths
        .into_iter()
        .enumerate()
        .map(|(order, path)| build_unit(path, order, settings, analyzer))
        .collect();

    for path in duplicate_outputs(&units) {
        warn!(
            "Several inputs convert to {}; later conversions overwrite earlier ones",
            path.display()
        );
    }

    Ok(units)
}

/// Converted paths shared by more than one unit, in discovery order
///
/// Converted files are named after the source basename only, so inputs with
/// the same name in different subfolders collide.
pub fn duplicate_outputs(units: &[AudioUnit]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for unit in units {
        if !seen.insert(&unit.converted_path) && !duplicates.contains(&unit.converted_path) {
            duplicates.push(unit.converted_path.clone());
        }
    }
    duplicates
}

/// Resolve the ordered list of input paths, from the list file or folder scan
pub fn scan_inputs(settings: &Settings) -> Result<Vec<PathBuf>> {
    let paths = match &settings.list {
        Some(list) => read_list(list)?,
        None => scan_folder(&settings.folder_in)?,
    };

    info!("Found {} files", paths.len());

    if paths.is_empty() {
        warn!("No input files found");
    }

    Ok(paths)
}

/// Read an explicit input list: one path per line, blank lines skipped
///
/// No extension filtering is applied to listed paths.
pub fn read_list(list: &Path) -> Result<Vec<PathBuf>> {
    if !list.exists() {
        return Err(Audio2hError::FileNotFound(list.to_path_buf()));
    }

    let contents = std::fs::read_to_string(list)?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Recursively walk `folder` for files with a supported extension
///
/// Entries are visited in file-name order so runs are reproducible.
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Audio2hError::FileNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.into_io_error().map(Audio2hError::Io).unwrap_or_else(|| {
                Audio2hError::ConfigError(format!(
                    "Filesystem loop while scanning {}",
                    folder.display()
                ))
            })
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if AudioFormat::is_supported_path(entry.path()) {
            trace!("Discovered: {}", entry.path().display());
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn build_unit(
    path: PathBuf,
    order: usize,
    settings: &Settings,
    analyzer: &dyn TempoAnalyzer,
) -> AudioUnit {
    let mut unit = AudioUnit::new(path, &settings.folder_out, order);

    match analyzer.analyze(&unit.source_path) {
        Ok(tempo) => {
            debug!(
                "{}: {:.2} BPM, {} beats, {:.2}s ({:?})",
                unit.file_name(),
                tempo.bpm,
                tempo.beats,
                tempo.duration_seconds,
                tempo.source
            );
            unit.apply_tempo(&tempo);
        }
        Err(e) => {
            warn!("{}", e);
        }
    }

    unit.metadata = metadata::extract_metadata(&unit.source_path);

    trace!("Unit {}: {:?}", order, unit);
    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_folder_filters_and_recurses() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        for name in ["b.FLAC", "a.wav", "notes.txt", "c.aiff", "nested/d.ogg", "nested/e.aif"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = scan_folder(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["a.wav", "b.FLAC", "nested/d.ogg", "nested/e.aif"]);
    }

    #[test]
    fn test_same_basename_in_subfolders_collides() {
        let out = Path::new("converted");
        let units: Vec<AudioUnit> = ["drums/amen.flac", "breaks/amen.flac", "drums/kick.wav", "x/amen.flac"]
            .iter()
            .enumerate()
            .map(|(i, p)| AudioUnit::new(PathBuf::from(p), out, i))
            .collect();

        assert_eq!(duplicate_outputs(&units), vec![out.join("amen.flac.wav")]);
        assert!(duplicate_outputs(&units[2..3]).is_empty());
    }

    #[test]
    fn test_scan_missing_folder_is_fatal() {
        let err = scan_folder(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Audio2hError::FileNotFound(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_read_list_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("list.txt");
        fs::write(&list, "one.flac\n\n  two.txt  \n\r\nthree.mp3\n").unwrap();

        let paths = read_list(&list).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("one.flac"),
                PathBuf::from("two.txt"),
                PathBuf::from("three.mp3")
            ]
        );
    }

    #[test]
    fn test_list_takes_priority_over_folder() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("list.txt");
        fs::write(&list, "x.wav\n").unwrap();

        let settings = Settings {
            list: Some(list),
            folder_in: PathBuf::from("/definitely/not/here"),
            ..Settings::default()
        };
        assert_eq!(scan_inputs(&settings).unwrap(), vec![PathBuf::from("x.wav")]);
    }
}
