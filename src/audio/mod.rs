//! Audio I/O: source decoding, sox conversion and converted-WAV decoding

pub mod converter;
pub mod decoder;
pub mod wav;

pub use converter::{convert_all, lowpass_cutoff, AudioConverter, ConversionJob, SoxConverter};
pub use decoder::{decode, probe_duration};
pub use wav::decode_wav_u8;
