//! Tempo analysis
//!
//! The trait abstraction allows swapping backends without changing pipeline code.

pub mod hint;
pub mod metadata;
pub mod stratum;
pub mod traits;

pub use hint::{FilenameHints, FilenameTempoAnalyzer};
pub use stratum::StratumTempoAnalyzer;
pub use traits::TempoAnalyzer;

use crate::config::{Settings, TempoBackend};

/// Build the analyzer selected in `settings`
pub fn build_analyzer(settings: &Settings) -> Box<dyn TempoAnalyzer> {
    match settings.tempo_backend {
        TempoBackend::Hinted => Box::new(FilenameTempoAnalyzer::with_fallback(Box::new(
            StratumTempoAnalyzer::new(),
        ))),
        TempoBackend::Stratum => Box::new(StratumTempoAnalyzer::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_analyzer_follows_backend() {
        let hinted = build_analyzer(&Settings::default());
        assert_eq!(hinted.name(), "filename");

        let stratum = build_analyzer(&Settings {
            tempo_backend: TempoBackend::Stratum,
            ..Settings::default()
        });
        assert_eq!(stratum.name(), "stratum-dsp");
    }
}
