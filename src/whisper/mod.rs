//! Whisper-backed implementation of the [`Recognizer`] capability.
//!
//! The model is loaded once per process (loading is by far the most
//! expensive step) and the same context is reused for every job in a
//! batch run. Inference itself goes through a fresh `WhisperState` per
//! call.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperSegment};

use crate::error::{Error, Result};
use crate::opts::{Device, ModelSize, Opts};
use crate::recognizer::Recognizer;
use crate::segments::{Segment, Transcription, centiseconds_to_seconds};

mod ctx;
mod logging;

/// Environment variable that overrides the model weight directory.
pub const MODEL_DIR_ENV: &str = "MURMUR_MODELS";

/// Language code reported when auto-detection was requested.
///
/// whisper-rs does not expose the detected language id after a run, so
/// auto runs are tagged `"und"` (undetermined) in output metadata rather
/// than guessing.
const UNDETERMINED_LANGUAGE: &str = "und";

/// Resolve the model directory: explicit flag, then the [`MODEL_DIR_ENV`]
/// override, then `./models`.
pub fn resolve_model_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os(MODEL_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./models"))
}

/// `Recognizer` implementation powered by `whisper-rs` / whisper.cpp.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    model_path: PathBuf,
}

impl WhisperRecognizer {
    /// Load the ggml weights for `size` from `model_dir` onto `device`.
    ///
    /// Fails with [`Error::Model`] when the weights are missing or the
    /// model cannot be initialized on the requested device.
    pub fn load(model_dir: &Path, size: ModelSize, device: Device) -> Result<Self> {
        let model_path = model_dir.join(size.ggml_filename());
        if !model_path.is_file() {
            return Err(Error::Model(format!(
                "model weights not found at '{}'; fetch them with `murmur-fetch --name {size}`",
                model_path.display()
            )));
        }

        info!(model = %model_path.display(), %device, "loading model");
        let ctx = ctx::load_context(&model_path, device)?;

        Ok(Self { ctx, model_path })
    }

    /// The weight file this recognizer was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Recognizer for WhisperRecognizer {
    fn transcribe(&mut self, samples: &[f32], opts: &Opts) -> Result<Transcription> {
        if samples.is_empty() {
            return Ok(Transcription {
                segments: Vec::new(),
                language: used_language(opts),
            });
        }

        let params = build_full_params(opts);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|err| Error::Inference(format!("failed to create whisper state: {err}")))?;

        state
            .full(params, samples)
            .map_err(|err| Error::Inference(format!("whisper inference failed: {err}")))?;

        let mut segments = Vec::new();
        for whisper_segment in state.as_iter() {
            segments.push(to_segment(whisper_segment)?);
        }

        debug!(segments = segments.len(), "recognition pass complete");

        Ok(Transcription {
            segments,
            language: used_language(opts),
        })
    }
}

fn used_language(opts: &Opts) -> String {
    opts.language
        .clone()
        .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_owned())
}

fn to_segment(segment: WhisperSegment) -> Result<Segment> {
    let text = segment
        .to_str()
        .map_err(|err| Error::Inference(format!("failed to read segment text: {err}")))?
        .trim()
        .to_owned();

    // whisper timestamps are centiseconds; negative values mean "unknown"
    // and clamp to zero, which keeps start <= end in the output.
    let start_seconds = centiseconds_to_seconds(segment.start_timestamp());
    let end_seconds = centiseconds_to_seconds(segment.end_timestamp()).max(start_seconds);

    Ok(Segment {
        start_seconds,
        end_seconds,
        text,
    })
}

fn build_full_params(opts: &Opts) -> FullParams<'_, '_> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(opts.task.is_translate());
    params.set_language(opts.language.as_deref());
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}
