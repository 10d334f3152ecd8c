use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::Error;

/// Whisper model sizes we know how to resolve to ggml weight files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    /// The weight file name for this size, following whisper.cpp's ggml
    /// naming. `large` resolves to the v3 weights.
    pub fn ggml_filename(self) -> &'static str {
        match self {
            ModelSize::Tiny => "ggml-tiny.bin",
            ModelSize::Base => "ggml-base.bin",
            ModelSize::Small => "ggml-small.bin",
            ModelSize::Medium => "ggml-medium.bin",
            ModelSize::Large => "ggml-large-v3.bin",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the model transcribes verbatim or translates into English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    Transcribe,
    Translate,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe",
            Task::Translate => "translate",
        }
    }

    /// Whether the model should render output in English.
    pub fn is_translate(self) -> bool {
        matches!(self, Task::Translate)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute device selection for model inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Gpu { index: i32 },
}

impl Device {
    /// The default device when none is requested: the GPU on macOS (Metal
    /// is ubiquitous there), the CPU everywhere else.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Device::Gpu { index: 0 }
        } else {
            Device::Cpu
        }
    }
}

impl FromStr for Device {
    type Err = Error;

    /// Accepts `cpu`, `gpu`, `cuda`, `metal`, or an indexed form such as
    /// `gpu:1` / `cuda:1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim().to_ascii_lowercase();
        match spec.as_str() {
            "cpu" => return Ok(Device::Cpu),
            "gpu" | "cuda" | "metal" => return Ok(Device::Gpu { index: 0 }),
            _ => {}
        }

        if let Some((name, index)) = spec.split_once(':') {
            if matches!(name, "gpu" | "cuda") {
                let index = index.parse::<i32>().map_err(|_| {
                    Error::InvalidInput(format!("bad device index in '{s}'"))
                })?;
                return Ok(Device::Gpu { index });
            }
        }

        Err(Error::InvalidInput(format!(
            "unknown device '{s}' (expected cpu, gpu, cuda, metal, or gpu:<index>)"
        )))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Gpu { index } => write!(f, "gpu:{index}"),
        }
    }
}

/// Options that control how a transcription is performed.
///
/// This is library-level configuration, not CLI flags directly: the CLI
/// maps user input into this type so other frontends (tests, batch jobs)
/// can construct options programmatically.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Language hint (e.g. `"en"`, `"de"`). `None` lets the model
    /// auto-detect the spoken language.
    pub language: Option<String>,

    /// Transcribe verbatim or translate into English.
    pub task: Task,
}
