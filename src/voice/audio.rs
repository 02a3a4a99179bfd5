/// Sample rate every segment is captured and stored at.
pub const SAMPLE_RATE: u32 = 44_100;
/// Segments are always single channel.
pub const CHANNELS: u16 = 1;

/// Capture format shared by the backend stream and the WAV container.
///
/// Samples are interleaved 32-bit floats in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    pub const CAPTURE_MONO: AudioFormat = AudioFormat {
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
    };

    pub fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        }
    }

    /// Number of whole frames contained in `samples` interleaved samples.
    pub fn frames(&self, samples: u32) -> u32 {
        samples / u32::from(self.channels.max(1))
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::CAPTURE_MONO
    }
}
