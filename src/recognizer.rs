use crate::error::Result;
use crate::opts::Opts;
use crate::segments::Transcription;

/// Capability interface over the external speech-recognition model.
///
/// A recognizer turns mono `f32` samples at
/// [`crate::decoder::DECODE_SAMPLE_RATE`] into an ordered [`Transcription`].
/// The production implementation is [`crate::whisper::WhisperRecognizer`];
/// tests substitute deterministic fakes so orchestration and formatting
/// stay testable without model weights.
///
/// The model itself (acoustic modeling, decoding search) is an external
/// collaborator; nothing in this crate reimplements it.
pub trait Recognizer {
    /// Run one recognition pass over a contiguous sample buffer.
    ///
    /// Takes `&mut self` because inference backends keep mutable run state.
    fn transcribe(&mut self, samples: &[f32], opts: &Opts) -> Result<Transcription>;
}
