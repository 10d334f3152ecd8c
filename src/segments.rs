use serde::{Deserialize, Serialize};

/// A contiguous span of recognized speech.
///
/// Segments arrive from the recognizer in chronological order and are
/// immutable once produced; encoders only read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    #[serde(rename = "start")]
    pub start_seconds: f32,

    /// End time in seconds. Never less than `start_seconds`; a
    /// zero-duration segment is legal.
    #[serde(rename = "end")]
    pub end_seconds: f32,

    /// Transcribed text.
    pub text: String,
}

/// The full output of one recognition pass over one input.
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Segments in chronological order.
    pub segments: Vec<Segment>,

    /// Language code the model worked in, or `"und"` when auto-detection
    /// was requested.
    pub language: String,
}

/// Convert whisper's centisecond timestamps to seconds, clamping the
/// negative sentinel values whisper uses for "unknown" to zero.
pub(crate) fn centiseconds_to_seconds(value: i64) -> f32 {
    if value < 0 { 0.0 } else { value as f32 / 100.0 }
}
