//! Decoding synthesized speech and handing it to an output.
//!
//! TTS responses arrive either as a WAV container or as bare PCM. [`decode_audio`]
//! tries the container first and otherwise reads the payload as little-endian
//! 16-bit mono at [`RAW_PCM_SAMPLE_RATE`].

use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Sample rate assumed for headerless PCM.
pub const RAW_PCM_SAMPLE_RATE: u32 = 24_000;

/// Interleaved samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio payload is empty")]
    Empty,

    #[error("failed to write audio: {0}")]
    Write(#[from] hound::Error),

    #[error("playback failed: {0}")]
    Playback(String),
}

/// Decode `bytes` as WAV, falling back to raw PCM when it is not a WAV file.
pub fn decode_audio(bytes: &[u8]) -> Result<DecodedAudio, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }
    match decode_wav(bytes) {
        Ok(audio) => Ok(audio),
        Err(e) => {
            tracing::debug!(error = %e, "not a WAV container, reading as raw PCM");
            decode_raw_pcm(bytes)
        }
    }
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, hound::Error> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

/// Headerless little-endian i16 mono. A trailing odd byte is ignored.
fn decode_raw_pcm(bytes: &[u8]) -> Result<DecodedAudio, AudioError> {
    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();
    if samples.is_empty() {
        return Err(AudioError::Empty);
    }
    Ok(DecodedAudio {
        sample_rate: RAW_PCM_SAMPLE_RATE,
        channels: 1,
        samples,
    })
}

/// Write `audio` as a 16-bit PCM WAV file.
pub fn write_wav(audio: &DecodedAudio, path: &Path) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in &audio.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Where decoded audio goes. `play` returns once playback has ended.
pub trait AudioSink: Send + Sync {
    fn play(&self, audio: &DecodedAudio) -> Result<(), AudioError>;
}

/// Writes a WAV file and runs an external player on it.
#[derive(Debug, Clone)]
pub struct CommandSink {
    player: String,
    output_dir: PathBuf,
}

impl CommandSink {
    /// `player` is split on whitespace; the WAV path is appended as the last
    /// argument. An empty `player` only writes the file.
    pub fn new(player: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            output_dir: output_dir.into(),
        }
    }

    fn output_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
        self.output_dir.join(format!("speech-{stamp}.wav"))
    }
}

impl AudioSink for CommandSink {
    fn play(&self, audio: &DecodedAudio) -> Result<(), AudioError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| AudioError::Playback(format!("cannot create {}: {e}", self.output_dir.display())))?;
        let path = self.output_path();
        write_wav(audio, &path)?;
        tracing::info!(path = %path.display(), secs = audio.duration_secs(), "speech written");

        let mut parts = self.player.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };

        let status = std::process::Command::new(program)
            .args(parts)
            .arg(&path)
            .status()
            .map_err(|e| AudioError::Playback(format!("cannot run {program}: {e}")))?;
        if !status.success() {
            return Err(AudioError::Playback(format!("{program} exited with {status}")));
        }
        Ok(())
    }
}

/// Discards audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, _audio: &DecodedAudio) -> Result<(), AudioError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in samples {
                writer.write_sample(*s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn wav_container_is_decoded_with_its_own_format() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[0, 16384, -32768, 0]);
        let audio = decode_audio(&bytes).unwrap();
        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples, vec![0.0, 0.5, -1.0, 0.0]);
    }

    #[test]
    fn headerless_bytes_fall_back_to_24k_mono_pcm() {
        let bytes = [0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F];
        let audio = decode_audio(&bytes).unwrap();
        assert_eq!(audio.sample_rate, RAW_PCM_SAMPLE_RATE);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 3);
        assert_eq!(audio.samples[0], 0.5);
        assert_eq!(audio.samples[1], -0.5);
        assert!((audio.samples[2] - 32767.0 / 32768.0).abs() < f32::EPSILON);
    }

    #[test]
    fn odd_trailing_byte_is_ignored() {
        let audio = decode_audio(&[0x00, 0x40, 0x12]).unwrap();
        assert_eq!(audio.samples, vec![0.5]);
    }

    #[test]
    fn empty_payload_is_an_error() {
        assert!(matches!(decode_audio(&[]), Err(AudioError::Empty)));
        assert!(matches!(decode_audio(&[0x01]), Err(AudioError::Empty)));
    }

    #[test]
    fn duration_accounts_for_channels() {
        let audio = DecodedAudio {
            sample_rate: 24_000,
            channels: 1,
            samples: vec![0.0; 12_000],
        };
        assert!((audio.duration_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn command_sink_without_player_only_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sink = CommandSink::new("", tmp.path());
        let audio = DecodedAudio {
            sample_rate: 24_000,
            channels: 1,
            samples: vec![0.25; 240],
        };
        sink.play(&audio).unwrap();

        let written: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
        let path = written[0].as_ref().unwrap().path();
        let decoded = decode_audio(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(decoded.samples.len(), 240);
        assert_eq!(decoded.sample_rate, 24_000);
    }
}
