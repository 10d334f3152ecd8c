use std::io::Write;

use anyhow::Result;

use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes segments in SubRip (SRT) format.
///
/// Each cue is a 1-based index line, a timing line using the comma
/// millisecond separator, the cue text, and a blank separator line.
pub struct SrtEncoder<W: Write> {
    w: W,

    /// Index of the last cue written; SRT numbering starts at 1.
    index: u32,

    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            index: 0,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            anyhow::bail!("cannot write segment: encoder is already closed");
        }

        self.index += 1;

        let start = format_timestamp_srt(seg.start_seconds);
        let end = format_timestamp_srt(seg.end_seconds);

        writeln!(&mut self.w, "{}", self.index)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        writeln!(&mut self.w, "{}", seg.text)?;
        writeln!(&mut self.w)?;

        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounds to the nearest millisecond to reduce drift when converting
/// from `f32`.
fn format_timestamp_srt(seconds: f32) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
