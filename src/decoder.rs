use std::path::Path;

use crate::error::Result;

/// Sample rate every decoder implementation must deliver, in Hz.
/// whisper.cpp expects its input at this rate.
pub const DECODE_SAMPLE_RATE: u32 = 16_000;

/// Capability interface for turning an audio file into a waveform.
///
/// The production implementation shells out to an external ffmpeg binary
/// ([`crate::ffmpeg::FfmpegDecoder`]); tests substitute deterministic
/// fakes so orchestration stays testable without real audio.
pub trait Decoder {
    /// Decode `path` into mono `f32` samples at [`DECODE_SAMPLE_RATE`],
    /// normalized to `[-1.0, 1.0]`.
    fn decode(&self, path: &Path) -> Result<Vec<f32>>;
}
