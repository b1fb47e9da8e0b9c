//! Synthesis backends, one per cascade tier.
//!
//! # Available Engines
//!
//! - [`espeak`] - speech via the espeak-ng CLI (must be installed)
//! - [`tone`] - in-process sine placeholder
//! - [`silence`] - in-process near-silent placeholder
//! - [`raw`] - hard-coded WAV bytes, no audio library involved

pub mod espeak;
pub mod raw;
pub mod silence;
pub mod tone;

use crate::config::GeneratorConfig;
use crate::SynthesisBackend;

use self::espeak::EspeakBackend;
use self::silence::SilenceBackend;
use self::tone::ToneBackend;

/// Build the speech, tone and silence tiers for `config`, highest fidelity first.
///
/// The speech tier is left out when espeak-ng cannot be run at startup. The
/// raw tier is not included; [`crate::Cascade`] always appends it itself.
pub fn default_backends(config: &GeneratorConfig) -> Vec<Box<dyn SynthesisBackend>> {
    let mut backends: Vec<Box<dyn SynthesisBackend>> = Vec::new();

    if config.disable_speech {
        log::info!("Speech tier disabled by configuration");
    } else {
        match EspeakBackend::probe(config.espeak.clone(), config.backend_timeout) {
            Ok(backend) => backends.push(Box::new(backend)),
            Err(e) => log::warn!("Speech tier unavailable, continuing without it: {e}"),
        }
    }

    backends.push(Box::new(ToneBackend::new(
        config.sample_rate,
        config.tone_duration,
    )));
    backends.push(Box::new(SilenceBackend::new(
        config.sample_rate,
        config.silence_duration,
    )));
    backends
}
