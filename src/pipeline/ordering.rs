//! Emission ordering strategies
//!
//! Units are sorted stably by the key a strategy assigns, then renumbered so
//! `order` matches their position in the header.

use crate::config::{OrderingKind, Settings};
use crate::error::{Audio2hError, Result};
use crate::types::{AudioUnit, UnitOutcome};
use std::path::Path;
use tracing::{debug, info, warn};

/// Assigns each unit a sort key; lower keys are emitted first
pub trait OrderingStrategy {
    fn rank(&self, unit: &AudioUnit) -> usize;

    /// Get the name of this strategy (for logging)
    fn name(&self) -> &'static str;
}

/// Keep discovery order
pub struct DiscoveryOrder;

impl OrderingStrategy for DiscoveryOrder {
    fn rank(&self, unit: &AudioUnit) -> usize {
        unit.order
    }

    fn name(&self) -> &'static str {
        "discovery"
    }
}

/// Rank by the manifest token found in the converted file name
///
/// When several tokens match, the last one in the manifest wins. Units
/// matching nothing go after every matched unit.
#[derive(Debug, Clone)]
pub struct ManifestOrder {
    tokens: Vec<String>,
}

impl ManifestOrder {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Parse a manifest: whitespace-separated file name tokens
    pub fn parse(contents: &str) -> Self {
        Self::new(contents.split_whitespace().map(str::to_string).collect())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Audio2hError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&contents);
        debug!(
            "Loaded {} ordering tokens from {}",
            manifest.tokens.len(),
            path.display()
        );
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl OrderingStrategy for ManifestOrder {
    fn rank(&self, unit: &AudioUnit) -> usize {
        let name = unit.converted_name();
        self.tokens
            .iter()
            .rposition(|token| name.contains(token.as_str()))
            .unwrap_or(usize::MAX)
    }

    fn name(&self) -> &'static str {
        "manifest"
    }
}

/// Build the strategy selected in `settings`
///
/// A missing or ignored manifest falls back to discovery order.
pub fn build_ordering(settings: &Settings) -> Box<dyn OrderingStrategy> {
    match (settings.ordering, &settings.manifest) {
        (OrderingKind::Discovery, _) => Box::new(DiscoveryOrder),
        (OrderingKind::Manifest, None) => {
            info!("Ordering manifest ignored, keeping discovery order");
            Box::new(DiscoveryOrder)
        }
        (OrderingKind::Manifest, Some(path)) => match ManifestOrder::load(path) {
            Ok(manifest) => Box::new(manifest),
            Err(e) => {
                warn!("{}; keeping discovery order", e);
                Box::new(DiscoveryOrder)
            }
        },
    }
}

/// Stable-sort outcomes by rank and renumber `order` to the new positions
pub fn apply_ordering(outcomes: &mut [UnitOutcome], strategy: &dyn OrderingStrategy) {
    outcomes.sort_by_key(|outcome| strategy.rank(outcome.unit()));

    for (position, outcome) in outcomes.iter_mut().enumerate() {
        outcome.unit_mut().order = position;
    }

    debug!("Ordered {} units by {}", outcomes.len(), strategy.name());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn outcomes(names: &[&str]) -> Vec<UnitOutcome> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| UnitOutcome::Ok {
                unit: AudioUnit::new(PathBuf::from(name), Path::new("converted"), i),
                samples: vec![],
            })
            .collect()
    }

    fn names(outcomes: &[UnitOutcome]) -> Vec<String> {
        outcomes.iter().map(|o| o.unit().file_name()).collect()
    }

    #[test]
    fn test_discovery_order_is_identity() {
        let mut list = outcomes(&["c.flac", "a.flac", "b.flac"]);
        apply_ordering(&mut list, &DiscoveryOrder);
        assert_eq!(names(&list), vec!["c.flac", "a.flac", "b.flac"]);
    }

    #[test]
    fn test_manifest_order_with_unmatched_last() {
        let manifest = ManifestOrder::parse("amen\n  break  \tcold_sweat");
        let mut list = outcomes(&["misc.flac", "cold_sweat.flac", "other.wav", "amen_8.flac"]);

        apply_ordering(&mut list, &manifest);

        assert_eq!(
            names(&list),
            vec!["amen_8.flac", "cold_sweat.flac", "misc.flac", "other.wav"]
        );
        let orders: Vec<usize> = list.iter().map(|o| o.unit().order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_last_matching_token_wins() {
        let manifest = ManifestOrder::parse("amen drums amen_break");
        let unit = AudioUnit::new(PathBuf::from("amen_break.flac"), Path::new("out"), 0);
        assert_eq!(manifest.rank(&unit), 2);
    }

    #[test]
    fn test_missing_manifest_falls_back() {
        let settings = Settings {
            ordering: OrderingKind::Manifest,
            manifest: Some(PathBuf::from("/no/such/filelist.txt")),
            ..Settings::default()
        };
        assert_eq!(build_ordering(&settings).name(), "discovery");

        let ignored = Settings {
            ordering: OrderingKind::Manifest,
            manifest: None,
            ..Settings::default()
        };
        assert_eq!(build_ordering(&ignored).name(), "discovery");
    }

    #[test]
    fn test_manifest_loaded_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filelist2.txt");
        std::fs::write(&path, "one two\nthree\n").unwrap();

        let settings = Settings {
            ordering: OrderingKind::Manifest,
            manifest: Some(path.clone()),
            ..Settings::default()
        };
        assert_eq!(build_ordering(&settings).name(), "manifest");
        assert_eq!(ManifestOrder::load(&path).unwrap().len(), 3);
    }
}
