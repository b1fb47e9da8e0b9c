use std::time::Duration;

use crate::error::BackendError;
use crate::manifest::ReciterOptions;
use crate::{db_to_amplitude, SynthesisBackend, SynthesisResult, Tier, Waveform};

/// Loudness of the placeholder beep.
pub const TONE_LEVEL_DB: f32 = -20.0;

/// Frequency-coded placeholder: a short sine beep whose pitch identifies the
/// reciter. Carries no information about the word itself.
#[derive(Debug, Clone)]
pub struct ToneBackend {
    sample_rate: u32,
    duration: Duration,
}

impl ToneBackend {
    pub fn new(sample_rate: u32, duration: Duration) -> Self {
        Self {
            sample_rate,
            duration,
        }
    }

    /// The unencoded beep for a reciter.
    pub fn waveform(&self, options: &ReciterOptions) -> Result<Waveform, BackendError> {
        let nyquist = self.sample_rate as f32 / 2.0;
        let freq = options.tone_frequency_hz;
        if !(freq > 0.0 && freq < nyquist) {
            return Err(BackendError::SynthesisFailed(format!(
                "tone frequency {freq} Hz is outside (0, {nyquist}) at {} Hz",
                self.sample_rate
            )));
        }
        Ok(Waveform::sine(
            freq,
            db_to_amplitude(TONE_LEVEL_DB),
            self.duration.as_secs_f32(),
            self.sample_rate,
        ))
    }
}

impl SynthesisBackend for ToneBackend {
    fn tier(&self) -> Tier {
        Tier::Tone
    }

    fn name(&self) -> &str {
        "tone"
    }

    fn synthesize(&mut self, _text: &str, options: &ReciterOptions) -> SynthesisResult {
        Ok(self.waveform(options)?.encode_wav()?)
    }
}
