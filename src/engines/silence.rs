use std::time::Duration;

use crate::manifest::ReciterOptions;
use crate::{db_to_amplitude, SynthesisBackend, SynthesisResult, Tier, Waveform};

/// A 20 Hz hum at -60 dBFS: inaudible on most speakers, but real audio data
/// so players do not treat the file as empty.
pub const SILENCE_FREQUENCY_HZ: f32 = 20.0;
pub const SILENCE_LEVEL_DB: f32 = -60.0;

/// Near-silent placeholder of a fixed length.
#[derive(Debug, Clone)]
pub struct SilenceBackend {
    sample_rate: u32,
    duration: Duration,
}

impl SilenceBackend {
    pub fn new(sample_rate: u32, duration: Duration) -> Self {
        Self {
            sample_rate,
            duration,
        }
    }
}

impl SynthesisBackend for SilenceBackend {
    fn tier(&self) -> Tier {
        Tier::Silence
    }

    fn name(&self) -> &str {
        "silence"
    }

    fn synthesize(&mut self, _text: &str, _options: &ReciterOptions) -> SynthesisResult {
        let wave = Waveform::sine(
            SILENCE_FREQUENCY_HZ,
            db_to_amplitude(SILENCE_LEVEL_DB),
            self.duration.as_secs_f32(),
            self.sample_rate,
        );
        Ok(wave.encode_wav()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MIN_VALID_BYTES;

    #[test]
    fn output_is_quiet_and_above_threshold() {
        let mut backend = SilenceBackend::new(22_050, Duration::from_millis(300));
        let artifact = backend.synthesize("", &ReciterOptions::default()).unwrap();
        assert!(artifact.len() as u64 >= MIN_VALID_BYTES);

        let mut reader = hound::WavReader::new(std::io::Cursor::new(&artifact.bytes)).unwrap();
        let peak = reader
            .samples::<i16>()
            .map(|s| s.unwrap().unsigned_abs())
            .max()
            .unwrap();
        // -60 dBFS of i16::MAX is roughly 33
        assert!(peak <= 40, "peak was {peak}");
    }
}
