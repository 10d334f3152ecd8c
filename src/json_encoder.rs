use std::io::Write;

use anyhow::Result;

use crate::opts::Task;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes a single JSON record.
///
/// The record carries run metadata alongside the segment sequence:
///
/// ```json
/// {
///   "language": "en",
///   "task": "transcribe",
///   "segments": [
///     { "start": 0.0, "end": 1.2, "text": "hello" }
///   ]
/// }
/// ```
///
/// Output streams directly into the writer; segments are never buffered.
/// The encoder is stateful so the surrounding object and array stay
/// well-formed however many segments arrive (including zero).
pub struct JsonEncoder<W: Write> {
    w: W,

    /// Whether we have written the record preamble (metadata + `"segments":[`).
    started: bool,

    /// Whether the next element will be the first element in the array.
    first: bool,

    closed: bool,

    language: String,
    task: Task,
}

impl<W: Write> JsonEncoder<W> {
    /// Create a JSON encoder carrying the run's language and task metadata.
    pub fn new(w: W, language: impl Into<String>, task: Task) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
            language: language.into(),
            task,
        }
    }

    /// Write the record preamble if we have not already done so.
    ///
    /// Deferred so that nothing is emitted until a segment is written or the
    /// encoder is closed; an empty transcription still yields valid JSON.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"{\"language\":")?;
            serde_json::to_writer(&mut self.w, &self.language)?;
            self.w.write_all(b",\"task\":")?;
            serde_json::to_writer(&mut self.w, self.task.as_str())?;
            self.w.write_all(b",\"segments\":[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for JsonEncoder<W> {
    /// Serialize a single segment and append it to the segments array.
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            anyhow::bail!("cannot write segment: encoder is already closed");
        }

        self.start_if_needed()?;

        // Write a comma before every element except the first.
        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, seg)?;
        self.w.flush()?;

        Ok(())
    }

    /// Finalize the record and flush the underlying writer.
    ///
    /// Idempotent; after closing, no further segments may be written.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]}")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
