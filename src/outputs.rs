//! Maps requested output formats to files on disk.
//!
//! Each format write is independent: a failure surfaces as
//! [`Error::OutputWrite`] for that file, and formats already written in the
//! same job are left in place (no rollback).

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::json_encoder::JsonEncoder;
use crate::opts::Task;
use crate::output_type::OutputType;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Transcription;
use crate::srt_encoder::SrtEncoder;
use crate::text_encoder::TextEncoder;
use crate::vtt_encoder::VttEncoder;

/// How to handle output paths that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace existing files. This is the default.
    Overwrite,

    /// Refuse to replace an existing file.
    Refuse,
}

/// Build the concrete output path for a format by appending its extension
/// to the base path.
///
/// Appending (rather than `with_extension`) keeps dotted stems intact:
/// base `talks/q3.review` becomes `talks/q3.review.txt`, not `talks/q3.txt`.
pub fn output_path(base: &Path, format: OutputType) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push(".");
    os.push(format.extension());
    PathBuf::from(os)
}

/// Write one file per requested format, returning the paths written in
/// request order.
pub fn write_outputs(
    transcription: &Transcription,
    task: Task,
    base: &Path,
    formats: &[OutputType],
    policy: OverwritePolicy,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = output_path(base, format);
        write_one(transcription, task, &path, format, policy)?;
        info!(path = %path.display(), "wrote {} output", format.extension());
        written.push(path);
    }
    Ok(written)
}

fn write_one(
    transcription: &Transcription,
    task: Task,
    path: &Path,
    format: OutputType,
    policy: OverwritePolicy,
) -> Result<()> {
    if policy == OverwritePolicy::Refuse && path.exists() {
        return Err(Error::OutputWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "output file already exists (overwriting disabled)",
            ),
        });
    }

    let file = File::create(path).map_err(|source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);

    let mut encoder: Box<dyn SegmentEncoder> = match format {
        OutputType::Txt => Box::new(TextEncoder::new(writer)),
        OutputType::Srt => Box::new(SrtEncoder::new(writer)),
        OutputType::Vtt => Box::new(VttEncoder::new(writer)),
        OutputType::Json => {
            Box::new(JsonEncoder::new(writer, transcription.language.as_str(), task))
        }
    };

    for seg in &transcription.segments {
        encoder
            .write_segment(seg)
            .map_err(|err| output_write_error(path, err))?;
    }
    encoder
        .close()
        .map_err(|err| output_write_error(path, err))?;

    Ok(())
}

fn output_write_error(path: &Path, err: anyhow::Error) -> Error {
    Error::OutputWrite {
        path: path.to_path_buf(),
        source: std::io::Error::other(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::Segment;

    fn transcription() -> Transcription {
        Transcription {
            segments: vec![
                Segment {
                    start_seconds: 0.0,
                    end_seconds: 1.5,
                    text: "first".to_string(),
                },
                Segment {
                    start_seconds: 1.5,
                    end_seconds: 3.0,
                    text: "second".to_string(),
                },
            ],
            language: "en".to_string(),
        }
    }

    #[test]
    fn output_path_appends_extension_without_eating_dotted_stems() {
        let base = Path::new("talks/q3.review");
        assert_eq!(
            output_path(base, OutputType::Txt),
            PathBuf::from("talks/q3.review.txt")
        );
        assert_eq!(
            output_path(Path::new("speech"), OutputType::Srt),
            PathBuf::from("speech.srt")
        );
    }

    #[test]
    fn writes_one_file_per_requested_format() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let base = dir.path().join("speech");

        let formats = [
            OutputType::Txt,
            OutputType::Srt,
            OutputType::Vtt,
            OutputType::Json,
        ];
        let written = write_outputs(
            &transcription(),
            Task::Transcribe,
            &base,
            &formats,
            OverwritePolicy::Overwrite,
        )?;

        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.is_file(), "missing output: {}", path.display());
        }
        assert!(std::fs::read_to_string(dir.path().join("speech.txt"))?.contains("first"));
        assert!(std::fs::read_to_string(dir.path().join("speech.vtt"))?.starts_with("WEBVTT"));
        Ok(())
    }

    #[test]
    fn refuse_policy_errors_on_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let base = dir.path().join("speech");
        std::fs::write(output_path(&base, OutputType::Txt), "old run")?;

        let err = write_outputs(
            &transcription(),
            Task::Transcribe,
            &base,
            &[OutputType::Txt],
            OverwritePolicy::Refuse,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "output write error");
        // The previous run's file is untouched.
        assert_eq!(
            std::fs::read_to_string(output_path(&base, OutputType::Txt))?,
            "old run"
        );
        Ok(())
    }

    #[test]
    fn overwrite_policy_replaces_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let base = dir.path().join("speech");
        std::fs::write(output_path(&base, OutputType::Txt), "old run")?;

        write_outputs(
            &transcription(),
            Task::Transcribe,
            &base,
            &[OutputType::Txt],
            OverwritePolicy::Overwrite,
        )?;

        let text = std::fs::read_to_string(output_path(&base, OutputType::Txt))?;
        assert_eq!(text, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn writing_twice_is_byte_identical() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let base = dir.path().join("speech");
        let formats = [OutputType::Srt, OutputType::Json];

        write_outputs(
            &transcription(),
            Task::Transcribe,
            &base,
            &formats,
            OverwritePolicy::Overwrite,
        )?;
        let first_srt = std::fs::read(output_path(&base, OutputType::Srt))?;
        let first_json = std::fs::read(output_path(&base, OutputType::Json))?;

        write_outputs(
            &transcription(),
            Task::Transcribe,
            &base,
            &formats,
            OverwritePolicy::Overwrite,
        )?;

        assert_eq!(std::fs::read(output_path(&base, OutputType::Srt))?, first_srt);
        assert_eq!(
            std::fs::read(output_path(&base, OutputType::Json))?,
            first_json
        );
        Ok(())
    }
}
