//! Converted WAV decoding using hound
//!
//! Reads the 8-bit mono files written by the converter back into the raw
//! unsigned byte values that go into the header.

use crate::error::{Audio2hError, Result};
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Decode `path` into first-channel 8-bit unsigned sample values
///
/// 8-bit files yield their stored bytes unchanged. Wider integer files keep
/// their top 8 bits; float files are quantized from [-1.0, 1.0].
pub fn decode_wav_u8(path: &Path) -> Result<Vec<u8>> {
    let reader = WavReader::open(path)
        .map_err(|e| Audio2hError::decode_error(path, format!("Failed to open WAV: {}", e)))?;

    let samples = read_first_channel(reader)
        .map_err(|e| Audio2hError::decode_error(path, format!("Failed to read samples: {}", e)))?;

    debug!("Decoded {} samples from {}", samples.len(), path.display());

    Ok(samples)
}

fn read_first_channel<R: Read>(mut reader: WavReader<R>) -> std::result::Result<Vec<u8>, hound::Error> {
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let mut out = Vec::with_capacity(reader.duration() as usize);

    match spec.sample_format {
        SampleFormat::Int => {
            // hound re-biases 8-bit data to signed, so every width arrives centered on 0
            let shift = spec.bits_per_sample.saturating_sub(8) as u32;
            for (i, sample) in reader.samples::<i32>().enumerate() {
                let sample = sample?;
                if i % channels == 0 {
                    out.push(((sample >> shift) + 128).clamp(0, 255) as u8);
                }
            }
        }
        SampleFormat::Float => {
            for (i, sample) in reader.samples::<f32>().enumerate() {
                let sample = sample?;
                if i % channels == 0 {
                    out.push((sample.clamp(-1.0, 1.0) * 127.5 + 127.5).round() as u8);
                }
            }
        }
    }

    Ok(out)
}
