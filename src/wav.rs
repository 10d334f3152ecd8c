use anyhow::{Context, Result};
use hound::WavReader;
use std::io::{Read, Seek};

use crate::decoder::DECODE_SAMPLE_RATE;

/// Load WAV audio from a reader and return normalized samples.
///
/// Format requirements:
/// - Mono (1 channel)
/// - 16-bit integer PCM at [`DECODE_SAMPLE_RATE`]
///
/// This is the exact shape ffmpeg is asked to produce, so a mismatch here
/// means the decode step itself went wrong.
pub fn samples_from_wav_reader<R>(reader: R) -> Result<Vec<f32>>
where
    R: Read + Seek,
{
    let mut reader = WavReader::new(reader).context("failed to read WAV data from reader")?;
    let spec = reader.spec();

    if spec.channels != 1 {
        anyhow::bail!(
            "expected mono WAV (1 channel), got {} channels",
            spec.channels
        );
    }

    if spec.sample_rate != DECODE_SAMPLE_RATE {
        anyhow::bail!(
            "expected {} Hz sample rate, got {} Hz",
            DECODE_SAMPLE_RATE,
            spec.sample_rate
        );
    }

    // Normalize i16 PCM to f32 in [-1.0, 1.0], the input format ASR
    // backends expect.
    let mut samples = Vec::new();
    for sample in reader.samples::<i16>() {
        let pcm = sample?;
        let normalized = pcm as f32 / i16::MAX as f32;
        samples.push(normalized);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav writer");
            for &s in samples {
                writer.write_sample(s).expect("write sample");
            }
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    #[test]
    fn reads_and_normalizes_mono_16k() -> anyhow::Result<()> {
        let bytes = wav_bytes(1, DECODE_SAMPLE_RATE, &[0, i16::MAX, i16::MIN + 1]);
        let samples = samples_from_wav_reader(Cursor::new(bytes))?;

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 1.0);
        assert_eq!(samples[2], -1.0);
        Ok(())
    }

    #[test]
    fn rejects_stereo() {
        let bytes = wav_bytes(2, DECODE_SAMPLE_RATE, &[0, 0]);
        let err = samples_from_wav_reader(Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("channels"));
    }

    #[test]
    fn rejects_wrong_sample_rate() {
        let bytes = wav_bytes(1, 44_100, &[0]);
        let err = samples_from_wav_reader(Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("sample rate"));
    }
}
