use std::path::PathBuf;

use thiserror::Error;

/// Murmur's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Murmur's crate-wide error taxonomy.
///
/// The variants mirror the stages of a transcription run, so callers can
/// tell a bad invocation apart from a decode failure or an unwritable
/// output path. Binaries wrap this with `anyhow` at the process edge;
/// library consumers get matchable variants.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad CLI combination or an unusable input path. Always fatal before
    /// any job starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The external decode tool is missing, or a file could not be decoded.
    #[error("audio decode failed for '{path}': {reason}")]
    AudioDecode { path: PathBuf, reason: String },

    /// The recognition model could not be loaded.
    #[error("model load failed: {0}")]
    Model(String),

    /// The recognition model failed while processing audio.
    #[error("inference failed: {0}")]
    Inference(String),

    /// An output file could not be written.
    #[error("failed to write output '{path}'")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Short, stable name of the error kind. Used in per-job failure
    /// reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid input",
            Error::AudioDecode { .. } => "audio decode error",
            Error::Model(_) => "model error",
            Error::Inference(_) => "inference error",
            Error::OutputWrite { .. } => "output write error",
        }
    }
}
