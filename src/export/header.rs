//! C header generation for the sampler firmware
//!
//! Every sample byte goes into one flash array. Each unit gets `RAW_<i>_*`
//! constants for its beat count, length and start offset, and three accessor
//! functions dispatch on the unit index. A silent dummy block always sits at
//! offset 0.

use crate::config::{FailurePolicy, Settings};
use crate::error::{Audio2hError, Result};
use crate::types::UnitOutcome;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info, warn};

/// Length of the leading silent block in bytes
pub const DUMMY_SAMPLES: usize = 65536 * 2;

/// 8-bit unsigned silence
pub const SILENCE: u8 = 0x80;

/// Note subdivisions for the retrigger table, whole note down to 1/16
/// (including dotted and triplet values), in beats
pub const RETRIGGER_MULTIPLIERS: [f64; 19] = [
    4.0,
    11.0 / 3.0,
    3.0,
    8.0 / 3.0,
    2.5,
    2.0,
    1.5,
    4.0 / 3.0,
    1.0,
    0.75,
    2.0 / 3.0,
    0.5,
    0.5 * 0.75,
    1.0 / 3.0,
    0.25,
    0.25 * 0.75,
    0.125,
    0.125 * 0.75,
    0.0625,
];

const VALUES_PER_LINE: usize = 20;

/// `round(60 / bpm * sample_rate / 2)`
pub fn samples_per_beat(bpm: f64, sample_rate: f64) -> f64 {
    (60.0 / bpm * sample_rate / 2.0).round()
}

/// Retrigger offsets in samples, one per entry of [`RETRIGGER_MULTIPLIERS`]
pub fn retrigger_table(samples_per_beat: f64) -> Vec<u32> {
    RETRIGGER_MULTIPLIERS
        .iter()
        .map(|m| (samples_per_beat * m).round() as u32)
        .collect()
}

/// One block of the flash array, as handed to the emitter
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderEntry {
    /// Source file name, used in comments
    pub name: String,
    /// Beats in the source file
    pub beats: f64,
    /// Converted 8-bit unsigned samples
    pub samples: Vec<u8>,
}

impl HeaderEntry {
    /// Beat count as written to the header: truncated, then doubled
    pub fn header_beats(&self) -> i64 {
        self.beats.trunc() as i64 * 2
    }
}

/// Turn outcomes into header entries according to `policy`
///
/// `Skip` drops failed units. `Placeholder` keeps them as one source beat
/// of silence (two header beats of `samples_per_beat` each).
pub fn entries_from_outcomes(
    outcomes: &[UnitOutcome],
    policy: FailurePolicy,
    samples_per_beat: f64,
) -> Vec<HeaderEntry> {
    outcomes
        .iter()
        .filter_map(|outcome| match (outcome, policy) {
            (UnitOutcome::Ok { unit, samples }, _) => Some(HeaderEntry {
                name: unit.file_name(),
                beats: unit.beat_count,
                samples: samples.clone(),
            }),
            (UnitOutcome::Failed { unit, reason }, FailurePolicy::Skip) => {
                warn!("Leaving {} out of the header: {}", unit.file_name(), reason);
                None
            }
            (UnitOutcome::Failed { unit, .. }, FailurePolicy::Placeholder) => {
                warn!("Emitting silence in place of {}", unit.file_name());
                Some(HeaderEntry {
                    name: unit.file_name(),
                    beats: 1.0,
                    samples: vec![SILENCE; 2 * samples_per_beat as usize],
                })
            }
        })
        .collect()
}

/// Position of one block in the flash array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub beats: i64,
    pub samples: usize,
    pub start: usize,
}

/// Offsets and tables computed from the entries, before any text is produced
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    pub samples_per_beat: f64,
    pub retrigs: Vec<u32>,
    pub dummy: BlockLayout,
    /// Blocks for the first `min(entries, limit)` entries
    pub blocks: Vec<BlockLayout>,
}

impl HeaderLayout {
    pub fn compute(entries: &[HeaderEntry], settings: &Settings) -> Self {
        let spb = samples_per_beat(settings.target_bpm, settings.target_sample_rate);

        let dummy = BlockLayout {
            beats: 1,
            samples: DUMMY_SAMPLES,
            start: 0,
        };

        let mut start = DUMMY_SAMPLES;
        let blocks = entries
            .iter()
            .take(settings.limit)
            .map(|entry| {
                let block = BlockLayout {
                    beats: entry.header_beats(),
                    samples: entry.samples.len(),
                    start,
                };
                start += entry.samples.len();
                block
            })
            .collect();

        Self {
            samples_per_beat: spb,
            retrigs: retrigger_table(spb),
            dummy,
            blocks,
        }
    }

    /// Total bytes in the flash array
    pub fn total_bytes(&self) -> usize {
        self.blocks
            .last()
            .map(|b| b.start + b.samples)
            .unwrap_or(self.dummy.samples)
    }
}

/// Render the complete header text
pub fn render(entries: &[HeaderEntry], settings: &Settings) -> String {
    let layout = HeaderLayout::compute(entries, settings);
    let emitted = &entries[..layout.blocks.len()];

    let mut out = String::with_capacity(layout.total_bytes() * 6 + 4096);
    write_all(&mut out, &layout, emitted, settings).expect("writing to a String cannot fail");
    out
}

fn write_all(
    out: &mut String,
    layout: &HeaderLayout,
    entries: &[HeaderEntry],
    settings: &Settings,
) -> std::fmt::Result {
    write_preamble(out, layout, settings)?;
    write_constants(out, layout, entries)?;
    write_array(out, entries)?;
    write_accessors(out, layout.blocks.len())
}

fn write_preamble(out: &mut String, layout: &HeaderLayout, settings: &Settings) -> std::fmt::Result {
    let retrig_type = if layout.retrigs.iter().all(|&r| r <= u16::MAX as u32) {
        "uint16_t"
    } else {
        "uint32_t"
    };
    let retrigs: Vec<String> = layout.retrigs.iter().map(|r| r.to_string()).collect();

    writeln!(out, "#include <pico/platform.h>")?;
    writeln!(out)?;
    writeln!(out, "#define SAMPLE_RATE {}", settings.sample_rate_hz())?;
    writeln!(out, "#define BPM_SAMPLED {}", settings.target_bpm as i64)?;
    writeln!(out, "#define NUM_SAMPLES {}", layout.blocks.len())?;
    writeln!(out, "#define SAMPLES_PER_BEAT {}", layout.samples_per_beat as i64)?;
    writeln!(out, "#define NUM_RETRIGS {}", layout.retrigs.len())?;
    writeln!(out, "const {} retrigs[] = {{ {} }};", retrig_type, retrigs.join(", "))
}

fn write_constants(out: &mut String, layout: &HeaderLayout, entries: &[HeaderEntry]) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "// filename: dummy")?;
    writeln!(out, "#define RAW_DUMMY_BEATS {}", layout.dummy.beats)?;
    writeln!(out, "#define RAW_DUMMY_SAMPLES {}", layout.dummy.samples)?;
    writeln!(out, "#define RAW_DUMMY_START {}", layout.dummy.start)?;

    for (i, (entry, block)) in entries.iter().zip(&layout.blocks).enumerate() {
        writeln!(out)?;
        writeln!(out, "// filename: {}", comment_safe(&entry.name))?;
        writeln!(out, "#define RAW_{}_BEATS {}", i, block.beats)?;
        writeln!(out, "#define RAW_{}_SAMPLES {}", i, block.samples)?;
        writeln!(out, "#define RAW_{}_START {}", i, block.start)?;
    }
    Ok(())
}

fn write_array(out: &mut String, entries: &[HeaderEntry]) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "const uint8_t __in_flash() raw_audio[] = {{")?;
    writeln!(out, "\t// dummy")?;
    write_bytes(out, &vec![SILENCE; DUMMY_SAMPLES])?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(out, "\t// {}: {}", i, comment_safe(&entry.name))?;
        write_bytes(out, &entry.samples)?;
    }
    writeln!(out, "}};")
}

fn write_bytes(out: &mut String, bytes: &[u8]) -> std::fmt::Result {
    for line in bytes.chunks(VALUES_PER_LINE) {
        out.push('\t');
        for (j, value) in line.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            write!(out, "0x{:02x},", value)?;
        }
        out.push('\n');
    }
    Ok(())
}

fn write_accessors(out: &mut String, count: usize) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "char raw_val(int s, int i) {{")?;
    for i in 0..count {
        writeln!(out, "\tif (s=={}) return raw_audio[i+RAW_{}_START];", i, i)?;
    }
    writeln!(out, "\treturn raw_audio[i];")?;
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "unsigned int raw_len(int s) {{")?;
    for i in 0..count {
        writeln!(out, "\tif (s=={}) return RAW_{}_SAMPLES;", i, i)?;
    }
    if count > 0 {
        writeln!(out, "\treturn RAW_0_SAMPLES;")?;
    } else {
        writeln!(out, "\treturn RAW_DUMMY_SAMPLES;")?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "unsigned int raw_beats(int s) {{")?;
    for i in 0..count {
        writeln!(out, "\tif (s=={}) return RAW_{}_BEATS;", i, i)?;
    }
    writeln!(out, "\treturn 1;")?;
    writeln!(out, "}}")
}

/// Keep file names from breaking out of a line comment
fn comment_safe(name: &str) -> String {
    name.replace(['\r', '\n'], " ")
}

/// Write the header, creating missing parent directories
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
pub fn write_header(text: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating header directory {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| Audio2hError::output_error(parent, e))?;
        }
    }

    let temp_path = path.with_extension("h.tmp");
    std::fs::write(&temp_path, text).map_err(|e| Audio2hError::output_error(&temp_path, e))?;

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        Audio2hError::output_error(path, e)
    })?;

    info!("Wrote header to {} ({} bytes)", path.display(), text.len());
    Ok(())
}
