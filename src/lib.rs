//! # recite-assets
//!
//! Generates a per-word audio catalog for a recited text, one WAV file per
//! word under each reciter's directory, through a cascade of synthesis
//! backends of decreasing fidelity.
//!
//! ## Tiers
//!
//! | Tier | Backend | Output |
//! |---|---|---|
//! | Speech | [`engines::espeak::EspeakBackend`] | espeak-ng rendering of the word |
//! | Tone | [`engines::tone::ToneBackend`] | reciter-specific sine beep |
//! | Silence | [`engines::silence::SilenceBackend`] | near-silent waveform |
//! | Raw | [`engines::raw::RawBytesBackend`] | hard-coded silent WAV bytes |
//!
//! Every destination is tried top-down and the first success is written.
//! The raw tier cannot fail, so every destination ends up holding a playable
//! file. Destinations that already hold a file of at least
//! [`storage::MIN_VALID_BYTES`] are left untouched, which makes re-runs
//! incremental and lets a real recording permanently replace a placeholder.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recite_assets::{generate, GeneratorConfigBuilder};
//!
//! let config = GeneratorConfigBuilder::default()
//!     .base_dir("qaris")
//!     .build()?;
//! let report = generate("data/audio_manifest.json".as_ref(), config)?;
//! println!("{report}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cascade;
pub mod config;
pub mod engines;
pub mod error;
pub mod manifest;
pub mod report;
pub mod storage;

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use serde::Serialize;

pub use cascade::Cascade;
pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use error::{BackendError, ManifestError};
pub use manifest::{Manifest, ReciterOptions, WordAsset};
pub use report::{Outcome, RunReport, RunStatus};

/// A position in the fallback cascade, ordered from highest to lowest fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Speech,
    Tone,
    Silence,
    Raw,
}

impl Tier {
    /// Only the speech tier renders the actual word.
    pub fn is_high_fidelity(self) -> bool {
        self == Tier::Speech
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Speech => "speech",
            Tier::Tone => "tone",
            Tier::Silence => "silence",
            Tier::Raw => "raw",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded audio produced by a backend, ready to be written to a destination.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Complete file contents
    pub bytes: Vec<u8>,
    /// Format of the encoded audio
    pub spec: hound::WavSpec,
}

impl Artifact {
    /// Wrap bytes that claim to be a WAV file, reading the format from the header.
    pub fn from_wav_bytes(bytes: Vec<u8>) -> Result<Self, BackendError> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(BackendError::SynthesisFailed(format!(
                "output is not a RIFF/WAVE stream ({} bytes)",
                bytes.len()
            )));
        }
        let spec = hound::WavReader::new(Cursor::new(bytes.as_slice()))?.spec();
        Ok(Self { bytes, spec })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What a backend hands back for one word.
pub type SynthesisResult = Result<Artifact, BackendError>;

/// Mono f32 samples generated in-process, before encoding.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Raw audio samples in `-1.0..=1.0`
    pub samples: Vec<f32>,
    /// Sample rate of the audio
    pub sample_rate: u32,
}

impl Waveform {
    /// A sine wave at `frequency_hz` with peak `amplitude` (linear, 0..1).
    pub fn sine(frequency_hz: f32, amplitude: f32, duration_secs: f32, sample_rate: u32) -> Self {
        let count = (duration_secs * sample_rate as f32).round() as usize;
        let step = std::f32::consts::TAU * frequency_hz / sample_rate as f32;
        let samples = (0..count)
            .map(|i| amplitude * (step * i as f32).sin())
            .collect();
        Self {
            samples,
            sample_rate,
        }
    }

    /// Encode as a 16-bit PCM WAV file held in memory.
    pub fn encode_wav(&self) -> Result<Artifact, hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in &self.samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16)?;
        }
        writer.finalize()?;
        Ok(Artifact {
            bytes: cursor.into_inner(),
            spec,
        })
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Converts `dBFS` into a linear peak amplitude.
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Common interface for every tier of the cascade.
///
/// Implementations report [`BackendError::Unavailable`] when the capability
/// itself is missing (binary not installed, library absent) and any other
/// error when only this particular input failed.
pub trait SynthesisBackend {
    /// Position of this backend in the cascade.
    fn tier(&self) -> Tier;

    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Render `text` for a reciter with the given options.
    fn synthesize(&mut self, text: &str, options: &ReciterOptions) -> SynthesisResult;
}

/// Load the manifest at `manifest_path` and run the default cascade over it.
///
/// Only manifest errors are returned; every per-destination failure is folded
/// into the report.
pub fn generate(manifest_path: &Path, config: GeneratorConfig) -> Result<RunReport, ManifestError> {
    let manifest = Manifest::from_path(manifest_path)?;
    let mut cascade = Cascade::with_default_backends(config);
    Ok(cascade.run(&manifest))
}
