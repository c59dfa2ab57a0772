//! Export modules for the C header and the JSON snapshot

pub mod header;
pub mod json;

pub use header::{entries_from_outcomes, render, write_header, HeaderEntry, HeaderLayout};
pub use json::{read_json, write_json};

use crate::config::Settings;
use crate::error::Result;
use crate::types::UnitOutcome;

/// Write the JSON snapshot, then the header
///
/// Returns the number of units written to the header, excluding the dummy.
pub fn emit(outcomes: &[UnitOutcome], settings: &Settings) -> Result<usize> {
    write_json(outcomes, settings)?;

    let spb = header::samples_per_beat(settings.target_bpm, settings.target_sample_rate);
    let entries = entries_from_outcomes(outcomes, settings.failure_policy, spb);
    let text = render(&entries, settings);
    write_header(&text, &settings.header_path)?;

    Ok(entries.len().min(settings.limit))
}
