use clap::ValueEnum;

/// The supported output formats for encoded transcription segments.
///
/// Each variant maps to a concrete `SegmentEncoder` implementation and to
/// exactly one file extension, so format selection stays explicit and
/// discoverable across the CLI and library code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum OutputType {
    /// Plain text, one segment per line.
    Txt,

    /// SubRip subtitles (numbered cues, comma millisecond separator).
    Srt,

    /// WebVTT subtitles.
    Vtt,

    /// A JSON record with segments plus language and task metadata.
    Json,
}

impl OutputType {
    /// The file extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Txt => "txt",
            OutputType::Srt => "srt",
            OutputType::Vtt => "vtt",
            OutputType::Json => "json",
        }
    }
}
