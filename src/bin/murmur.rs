use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use murmur::ffmpeg::FfmpegDecoder;
use murmur::jobs::plan_jobs;
use murmur::logging;
use murmur::opts::{Device, ModelSize, Opts, Task};
use murmur::output_type::OutputType;
use murmur::outputs::OverwritePolicy;
use murmur::pipeline::{Pipeline, RunConfig, summarize};
use murmur::whisper::{WhisperRecognizer, resolve_model_dir};

#[derive(Parser, Debug)]
#[command(name = "murmur", version)]
#[command(about = "Transcribe audio files locally with Whisper")]
struct Params {
    /// Input audio file, or a directory with --batch.
    input: PathBuf,

    /// Whisper model size.
    #[arg(short = 'm', long = "model", value_enum, default_value_t = ModelSize::Small)]
    model: ModelSize,

    /// Output base path; each format replaces the extension. Defaults to
    /// the input path with its extension stripped.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Comma-separated output formats.
    #[arg(
        short = 'f',
        long = "formats",
        value_enum,
        value_delimiter = ',',
        default_value = "txt"
    )]
    formats: Vec<OutputType>,

    /// Language code ("en", "de", ...) or "auto" to let the model detect it.
    #[arg(short = 'l', long = "language", default_value = "auto")]
    language: String,

    /// Transcribe verbatim or translate into English.
    #[arg(short = 't', long = "task", value_enum, default_value_t = Task::Transcribe)]
    task: Task,

    /// Process every recognized audio file in the input directory.
    #[arg(short = 'b', long = "batch")]
    batch: bool,

    /// Recurse into subdirectories (only meaningful with --batch).
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Compute device: "cpu", "gpu", "cuda", "metal", or "gpu:<index>".
    /// Defaults to a platform-appropriate choice.
    #[arg(short = 'd', long = "device")]
    device: Option<String>,

    /// Directory holding ggml model weights (also settable via
    /// MURMUR_MODELS). Defaults to ./models.
    #[arg(long = "model-dir")]
    model_dir: Option<PathBuf>,

    /// Refuse to replace existing output files.
    #[arg(long = "no-overwrite")]
    no_overwrite: bool,

    /// Increase log verbosity.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let params = Params::parse();
    logging::init(params.verbose);

    match run(params) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(params: Params) -> Result<()> {
    let started = Instant::now();

    let language = match params.language.trim() {
        "" | "auto" => None,
        code => Some(code.to_owned()),
    };
    let device = match &params.device {
        Some(spec) => spec.parse::<Device>()?,
        None => Device::platform_default(),
    };

    let jobs = plan_jobs(
        &params.input,
        params.output.clone(),
        params.batch,
        params.recursive,
    )?;

    // Resolve both external dependencies before any job starts: a missing
    // ffmpeg or missing weights should fail the invocation, not job three
    // of a long batch.
    let decoder = FfmpegDecoder::resolve()?;
    let model_dir = resolve_model_dir(params.model_dir.clone());
    let recognizer = WhisperRecognizer::load(&model_dir, params.model, device)?;

    let config = RunConfig {
        opts: Opts {
            language,
            task: params.task,
        },
        formats: params.formats.clone(),
        overwrite: if params.no_overwrite {
            OverwritePolicy::Refuse
        } else {
            OverwritePolicy::Overwrite
        },
    };
    let mut pipeline = Pipeline::new(decoder, recognizer, config)?;

    if params.batch {
        let reports = pipeline.run_batch(jobs);
        let summary = summarize(&reports);
        info!("{} succeeded, {} failed", summary.succeeded, summary.failed);
        info!(
            "total processing time: {:.2}s",
            started.elapsed().as_secs_f64()
        );

        if summary.failed > 0 {
            anyhow::bail!(
                "{} of {} jobs failed",
                summary.failed,
                summary.succeeded + summary.failed
            );
        }
        return Ok(());
    }

    // Single-file mode: the job's error is the process's error.
    for job in &jobs {
        let written = pipeline.process_job(job)?;
        let listed: Vec<String> = written
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        info!("transcription saved to: {}", listed.join(", "));
    }
    info!(
        "total processing time: {:.2}s",
        started.elapsed().as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_with_defaults() {
        let params = Params::try_parse_from(["murmur", "talk.mp3"]).expect("parse params");
        assert_eq!(params.model, ModelSize::Small);
        assert_eq!(params.formats, vec![OutputType::Txt]);
        assert_eq!(params.language, "auto");
        assert_eq!(params.task, Task::Transcribe);
        assert!(!params.batch);
        assert!(!params.no_overwrite);
    }

    #[test]
    fn params_parse_comma_separated_formats() {
        let params = Params::try_parse_from(["murmur", "talk.mp3", "-f", "txt,srt,json"])
            .expect("parse params");
        assert_eq!(
            params.formats,
            vec![OutputType::Txt, OutputType::Srt, OutputType::Json]
        );
    }

    #[test]
    fn params_reject_unknown_format() {
        assert!(Params::try_parse_from(["murmur", "talk.mp3", "-f", "docx"]).is_err());
    }

    #[test]
    fn params_parse_batch_flags() {
        let params =
            Params::try_parse_from(["murmur", "clips/", "-b", "-r", "-m", "tiny", "-t", "translate"])
                .expect("parse params");
        assert!(params.batch);
        assert!(params.recursive);
        assert_eq!(params.model, ModelSize::Tiny);
        assert_eq!(params.task, Task::Translate);
    }
}
