//! Sequencing for transcription runs: decode → recognize → write outputs.
//!
//! Jobs run strictly sequentially. One file is fully processed before the
//! next begins, which bounds memory and lets a single loaded model serve
//! the whole run.

use std::path::PathBuf;

use tracing::{error, info};

use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::jobs::TranscriptionJob;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::outputs::{OverwritePolicy, write_outputs};
use crate::recognizer::Recognizer;

/// Everything a run needs beyond the per-file jobs themselves.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub opts: Opts,

    /// Formats written for every job. Must be non-empty.
    pub formats: Vec<OutputType>,

    pub overwrite: OverwritePolicy,
}

/// Terminal record of one processed job.
#[derive(Debug)]
pub struct JobReport {
    pub job: TranscriptionJob,

    /// Output files written, one per requested format, in request order.
    /// Empty when the job failed.
    pub written: Vec<PathBuf>,

    pub error: Option<Error>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Tally of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub fn summarize(reports: &[JobReport]) -> BatchSummary {
    let succeeded = reports.iter().filter(|r| r.succeeded()).count();
    BatchSummary {
        succeeded,
        failed: reports.len() - succeeded,
    }
}

/// Owns the decoder and recognizer for the lifetime of a run.
///
/// The recognizer (and the model it loaded) is created once by the caller,
/// borrowed mutably per job, and released when the pipeline is dropped
/// after the run completes.
pub struct Pipeline<D: Decoder, R: Recognizer> {
    decoder: D,
    recognizer: R,
    config: RunConfig,
}

impl<D: Decoder, R: Recognizer> Pipeline<D, R> {
    pub fn new(decoder: D, recognizer: R, config: RunConfig) -> Result<Self> {
        if config.formats.is_empty() {
            return Err(Error::InvalidInput(
                "at least one output format is required".to_string(),
            ));
        }
        Ok(Self {
            decoder,
            recognizer,
            config,
        })
    }

    /// Process one job to completion: decode, transcribe, write every
    /// requested format.
    pub fn process_job(&mut self, job: &TranscriptionJob) -> Result<Vec<PathBuf>> {
        info!(input = %job.input.display(), "processing file");

        let samples = self.decoder.decode(&job.input)?;
        let transcription = self.recognizer.transcribe(&samples, &self.config.opts)?;

        info!(
            segments = transcription.segments.len(),
            language = %transcription.language,
            "transcription finished"
        );

        write_outputs(
            &transcription,
            self.config.opts.task,
            &job.output_base,
            &self.config.formats,
            self.config.overwrite,
        )
    }

    /// Run jobs sequentially, recording per-job outcomes.
    ///
    /// A failing job is logged and recorded but never aborts the remaining
    /// jobs; callers decide the process outcome from the reports.
    pub fn run_batch(&mut self, jobs: Vec<TranscriptionJob>) -> Vec<JobReport> {
        let mut reports = Vec::with_capacity(jobs.len());
        for job in jobs {
            let report = match self.process_job(&job) {
                Ok(written) => JobReport {
                    job,
                    written,
                    error: None,
                },
                Err(err) => {
                    error!(
                        input = %job.input.display(),
                        kind = err.kind(),
                        "job failed: {err}"
                    );
                    JobReport {
                        job,
                        written: Vec::new(),
                        error: Some(err),
                    }
                }
            };
            reports.push(report);
        }
        reports
    }
}
