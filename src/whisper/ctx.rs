use std::path::Path;

use whisper_rs::{WhisperContext, WhisperContextParameters};

use crate::error::{Error, Result};
use crate::opts::Device;

use super::logging::init_whisper_logging;

/// Load Whisper weights and return an initialized context.
///
/// Model loading is centralized here so device mapping and error handling
/// stay consistent, and so whisper.cpp's own (very noisy) logging is
/// silenced before the first load.
pub(super) fn load_context(model_path: &Path, device: Device) -> Result<WhisperContext> {
    init_whisper_logging();

    let mut ctx_params = WhisperContextParameters::default();
    match device {
        Device::Cpu => {
            ctx_params.use_gpu = false;
        }
        Device::Gpu { index } => {
            ctx_params.use_gpu = true;
            ctx_params.gpu_device = index;
        }
    }

    let model_path_str = model_path.to_str().ok_or_else(|| {
        Error::Model(format!(
            "model path is not valid UTF-8: {}",
            model_path.display()
        ))
    })?;

    WhisperContext::new_with_params(model_path_str, ctx_params).map_err(|err| {
        Error::Model(format!(
            "failed to load model from '{}': {err}",
            model_path.display()
        ))
    })
}
