//! audio2h - Loop bank builder for a Pico sampler
//!
//! Batch-converts a folder of audio loops into tempo- and sample-rate
//! normalized 8-bit mono WAV files with sox, then packs every sample byte
//! into one generated C header with offset, length, beat and retrigger
//! constants. A JSON snapshot of the run is written alongside.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: List files and recursive folder scans
//! - `analysis`: Tempo analysis (filename hints, stratum-dsp) and tag metadata
//! - `audio`: Source decoding, sox conversion, converted-WAV decoding
//! - `pipeline`: Sequential orchestration and emission ordering
//! - `export`: C header and JSON snapshot output
//!
//! # Example
//!
//! ```no_run
//! use audio2h::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let result = pipeline::run(&settings).expect("Conversion failed");
//! println!("Emitted {} units", result.emitted);
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{Audio2hError, Result};
pub use types::{AudioBuffer, AudioUnit, TempoResult, UnitOutcome};
