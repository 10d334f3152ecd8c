use anyhow::Result;

use crate::segments::Segment;

/// Streams `Segment`s into some output representation.
///
/// Encoders are stateful: `write_segment` is called once per segment in
/// chronological order, then `close` exactly once. `close` must be
/// idempotent, and writes after `close` are an error.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
