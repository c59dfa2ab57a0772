//! Metadata extraction from audio file tags
//!
//! Uses lofty to read ID3v2 (MP3), Vorbis comments (FLAC/OGG), and AIFF tags.
//! Tags only end up in the JSON snapshot.

use crate::types::UnitMetadata;
use lofty::{Accessor, Probe, TaggedFileExt};
use std::path::Path;
use tracing::{debug, trace};

/// Extract metadata from an audio file's tags
///
/// On error (corrupt tags, missing file), returns default empty metadata.
pub fn extract_metadata(path: &Path) -> UnitMetadata {
    match extract_metadata_inner(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("No readable tags in {}: {}", path.display(), e);
            UnitMetadata::default()
        }
    }
}

fn extract_metadata_inner(path: &Path) -> Result<UnitMetadata, lofty::error::LoftyError> {
    let tagged_file = Probe::open(path)?.read()?;
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let metadata = match tag {
        Some(tag) => UnitMetadata {
            title: tag.title().map(|s| s.to_string()),
            artist: tag.artist().map(|s| s.to_string()),
            album: tag.album().map(|s| s.to_string()),
        },
        None => {
            trace!("No tags found in {}", path.display());
            UnitMetadata::default()
        }
    };

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_empty_metadata() {
        let metadata = extract_metadata(Path::new("/no/such/file.flac"));
        assert_eq!(metadata, UnitMetadata::default());
    }
}
