use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;
use uuid::Uuid;

use crate::decoder::{DECODE_SAMPLE_RATE, Decoder};
use crate::error::{Error, Result};
use crate::wav::samples_from_wav_reader;

/// Environment variable that overrides the ffmpeg binary location.
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// `Decoder` implementation backed by an external ffmpeg binary.
///
/// ffmpeg decodes whatever container/codec the input uses into a temporary
/// mono 16 kHz 16-bit PCM WAV, which is read back and normalized. The temp
/// file is a scoped [`tempfile::NamedTempFile`], so it is removed on every
/// exit path, including decode failures after partial writes.
pub struct FfmpegDecoder {
    binary: PathBuf,
}

impl FfmpegDecoder {
    /// Resolve the ffmpeg binary and verify it runs.
    ///
    /// Resolution order: the [`FFMPEG_PATH_ENV`] override, then `ffmpeg` on
    /// the search path. Verification happens once, up front, so a batch run
    /// never gets halfway through before discovering the dependency is
    /// missing.
    pub fn resolve() -> Result<Self> {
        let binary = match env::var_os(FFMPEG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("ffmpeg"),
        };

        let probe = Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match probe {
            Ok(status) if status.success() => {
                debug!(binary = %binary.display(), "resolved ffmpeg");
                Ok(Self { binary })
            }
            Ok(status) => Err(Error::AudioDecode {
                path: binary.clone(),
                reason: format!("ffmpeg probe exited with {status}"),
            }),
            Err(err) => Err(Error::AudioDecode {
                path: binary.clone(),
                reason: format!(
                    "ffmpeg not found ({err}); install ffmpeg or point {FFMPEG_PATH_ENV} at the binary"
                ),
            }),
        }
    }

    /// The resolved binary path.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Decoder for FfmpegDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<f32>> {
        if !path.is_file() {
            return Err(decode_error(path, "file not found"));
        }

        // The unique token keeps temp names from colliding across
        // concurrent process runs.
        let token = Uuid::new_v4();
        let temp = tempfile::Builder::new()
            .prefix(&format!("murmur-{token}-"))
            .suffix(".wav")
            .tempfile()
            .map_err(|err| decode_error(path, format!("failed to create temp file: {err}")))?;

        let output = Command::new(&self.binary)
            .arg("-nostdin")
            .arg("-i")
            .arg(path)
            .args(["-vn", "-ac", "1", "-ar"])
            .arg(DECODE_SAMPLE_RATE.to_string())
            .args(["-acodec", "pcm_s16le", "-f", "wav", "-y"])
            .arg(temp.path())
            .stdout(Stdio::null())
            .output()
            .map_err(|err| {
                decode_error(path, format!("failed to run {}: {err}", self.binary.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(decode_error(
                path,
                format!(
                    "ffmpeg exited with {}: {}",
                    output.status,
                    last_stderr_line(&stderr)
                ),
            ));
        }

        let wav = File::open(temp.path())
            .map_err(|err| decode_error(path, format!("failed to reopen decoded audio: {err}")))?;
        let samples = samples_from_wav_reader(wav)
            .map_err(|err| decode_error(path, format!("{err:#}")))?;

        debug!(
            input = %path.display(),
            samples = samples.len(),
            "decoded audio"
        );

        // `temp` drops here; the decoded WAV is removed on all exit paths.
        Ok(samples)
    }
}

fn decode_error(path: &Path, reason: impl Into<String>) -> Error {
    Error::AudioDecode {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// ffmpeg's stderr is verbose; the last non-empty line is almost always the
/// actual failure diagnostic.
fn last_stderr_line(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("(no diagnostic output)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_stderr_line_picks_final_diagnostic() {
        let stderr = "ffmpeg version 6.0\nbuilt with gcc\n\nclip.mp3: Invalid data found\n\n";
        assert_eq!(last_stderr_line(stderr), "clip.mp3: Invalid data found");
    }

    #[test]
    fn last_stderr_line_handles_empty_output() {
        assert_eq!(last_stderr_line(""), "(no diagnostic output)");
        assert_eq!(last_stderr_line("\n \n"), "(no diagnostic output)");
    }

    #[test]
    fn decode_rejects_missing_file() {
        let decoder = FfmpegDecoder {
            binary: PathBuf::from("ffmpeg"),
        };
        let err = decoder
            .decode(Path::new("definitely/not/here.mp3"))
            .unwrap_err();
        assert_eq!(err.kind(), "audio decode error");
        assert!(err.to_string().contains("file not found"));
    }
}
