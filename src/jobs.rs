//! Job planning: turning the invocation input into per-file work units.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Audio file extensions recognized in batch mode.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "aac", "ogg", "m4a"];

/// One unit of work: a single input file and the base path its outputs
/// are derived from. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionJob {
    pub input: PathBuf,
    pub output_base: PathBuf,
}

impl TranscriptionJob {
    /// Job for `input`. Without an explicit base, outputs land next to the
    /// input file under the same stem; an explicit base has its extension
    /// stripped so `out.txt` and `out` behave the same.
    pub fn new(input: PathBuf, output_base: Option<PathBuf>) -> Self {
        let output_base = match output_base {
            Some(base) => base.with_extension(""),
            None => input.with_extension(""),
        };
        Self { input, output_base }
    }
}

/// Whether `path` carries a recognized audio extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Enumerate recognized audio files under `dir`, sorted so batch job order
/// is deterministic.
pub fn find_audio_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| {
            Error::InvalidInput(format!("failed to read directory '{}': {err}", dir.display()))
        })?;
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Resolve a user-supplied input path.
///
/// A missing relative path is retried under an `audio/` subdirectory of
/// the working directory before failing, so `murmur talk.mp3` works from a
/// project root that keeps recordings in `audio/`.
pub fn resolve_input(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    if path.is_relative() {
        if let Some(name) = path.file_name() {
            let alternative = Path::new("audio").join(name);
            if alternative.exists() {
                info!(input = %alternative.display(), "found input under audio/");
                return Ok(alternative);
            }
        }
    }

    Err(Error::InvalidInput(format!(
        "input not found: {}",
        path.display()
    )))
}

/// Turn the invocation input into concrete jobs.
///
/// - A file input yields exactly one job, honoring an explicit output base.
/// - A directory input requires `batch`; each recognized audio file becomes
///   one job with outputs next to it. An explicit output base is ignored in
///   batch mode (outputs follow their inputs).
pub fn plan_jobs(
    input: &Path,
    output: Option<PathBuf>,
    batch: bool,
    recursive: bool,
) -> Result<Vec<TranscriptionJob>> {
    let input = resolve_input(input)?;

    if input.is_file() {
        return Ok(vec![TranscriptionJob::new(input, output)]);
    }

    if !input.is_dir() {
        return Err(Error::InvalidInput(format!(
            "input is neither a file nor a directory: {}",
            input.display()
        )));
    }

    if !batch {
        return Err(Error::InvalidInput(format!(
            "'{}' is a directory; pass --batch to process it",
            input.display()
        )));
    }

    if output.is_some() {
        warn!("--output is ignored in batch mode; outputs land next to each input");
    }

    let files = find_audio_files(&input, recursive)?;
    if files.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no audio files found in '{}'",
            input.display()
        )));
    }

    info!(count = files.len(), "found audio files to process");
    Ok(files
        .into_iter()
        .map(|file| TranscriptionJob::new(file, None))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_audio_extensions_case_insensitively() {
        assert!(is_audio_file(Path::new("a/talk.mp3")));
        assert!(is_audio_file(Path::new("a/talk.WAV")));
        assert!(is_audio_file(Path::new("talk.FlAc")));
        assert!(!is_audio_file(Path::new("notes.txt")));
        assert!(!is_audio_file(Path::new("no_extension")));
    }

    #[test]
    fn job_output_base_strips_input_extension() {
        let job = TranscriptionJob::new(PathBuf::from("clips/talk.mp3"), None);
        assert_eq!(job.output_base, PathBuf::from("clips/talk"));
    }

    #[test]
    fn job_explicit_output_base_strips_extension_too() {
        let job = TranscriptionJob::new(
            PathBuf::from("talk.mp3"),
            Some(PathBuf::from("out/result.txt")),
        );
        assert_eq!(job.output_base, PathBuf::from("out/result"));
    }

    #[test]
    fn find_audio_files_counts_only_recognized_extensions() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["a.wav", "b.mp3", "c.ogg"] {
            std::fs::write(dir.path().join(name), b"")?;
        }
        for name in ["notes.txt", "cover.png"] {
            std::fs::write(dir.path().join(name), b"")?;
        }

        let files = find_audio_files(dir.path(), false)?;
        assert_eq!(files.len(), 3);
        Ok(())
    }

    #[test]
    fn find_audio_files_recurses_only_when_asked() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("top.wav"), b"")?;
        std::fs::create_dir(dir.path().join("nested"))?;
        std::fs::write(dir.path().join("nested/deep.mp3"), b"")?;

        let flat = find_audio_files(dir.path(), false)?;
        assert_eq!(flat.len(), 1);

        let deep = find_audio_files(dir.path(), true)?;
        assert_eq!(deep.len(), 2);
        Ok(())
    }

    #[test]
    fn find_audio_files_returns_sorted_paths() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["zeta.wav", "alpha.wav", "mid.wav"] {
            std::fs::write(dir.path().join(name), b"")?;
        }

        let files = find_audio_files(dir.path(), false)?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["alpha.wav", "mid.wav", "zeta.wav"]);
        Ok(())
    }

    #[test]
    fn plan_jobs_rejects_directory_without_batch() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("a.wav"), b"")?;

        let err = plan_jobs(dir.path(), None, false, false).unwrap_err();
        assert_eq!(err.kind(), "invalid input");
        Ok(())
    }

    #[test]
    fn plan_jobs_rejects_empty_batch_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("notes.txt"), b"")?;

        let err = plan_jobs(dir.path(), None, true, false).unwrap_err();
        assert_eq!(err.kind(), "invalid input");
        Ok(())
    }

    #[test]
    fn plan_jobs_single_file_honors_explicit_output() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("talk.mp3");
        std::fs::write(&input, b"")?;

        let jobs = plan_jobs(&input, Some(dir.path().join("custom.srt")), false, false)?;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_base, dir.path().join("custom"));
        Ok(())
    }
}
