//! The manifest: which reciters exist and which words each of them needs.
//!
//! ```json
//! {
//!   "title": "Al-Fatiha",
//!   "reciters": [
//!     { "id": "mishary", "display_name": "Mishary Rashid Alafasy",
//!       "options": { "slow": false, "language": "ar", "tone_frequency_hz": 300.0 } }
//!   ],
//!   "words": [
//!     { "source_text": "بِسْمِ", "relative_filename": "001_001_001.wav",
//!       "transliteration": "bismi", "verse": 1 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestError;
use crate::storage::ARTIFACT_EXTENSION;

/// Per-reciter synthesis settings, handed to every backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReciterOptions {
    /// Deliberate, slow delivery.
    #[serde(default)]
    pub slow: bool,
    /// espeak-ng voice / language code.
    #[serde(default = "default_language")]
    pub language: String,
    /// Pitch of the tone placeholder, so reciters stay distinguishable.
    #[serde(default = "default_tone_frequency")]
    pub tone_frequency_hz: f32,
}

fn default_language() -> String {
    "ar".to_string()
}

fn default_tone_frequency() -> f32 {
    440.0
}

impl Default for ReciterOptions {
    fn default() -> Self {
        Self {
            slow: false,
            language: default_language(),
            tone_frequency_hz: default_tone_frequency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reciter {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub options: ReciterOptions,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Word {
    pub source_text: String,
    pub relative_filename: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub verse: Option<u32>,
}

/// One file to materialize: a word as seen from one reciter's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAsset {
    pub source_text: String,
    /// `<reciter id>/<relative_filename>`, relative to the storage root.
    pub destination_path: PathBuf,
    pub reciter: String,
}

/// Immutable input document for a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub title: Option<String>,
    pub reciters: Vec<Reciter>,
    pub words: Vec<Word>,
}

impl Manifest {
    /// Read and validate a manifest file.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::Missing(path.to_path_buf()));
            }
            Err(e) => return Err(ManifestError::Io(e)),
        };
        let manifest = Self::from_json(&content)?;
        log::info!(
            "Loaded manifest {} ({} reciters, {} words)",
            path.display(),
            manifest.reciters.len(),
            manifest.words.len()
        );
        Ok(manifest)
    }

    /// Parse and validate a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.reciters.is_empty() {
            return Err(ManifestError::Invalid("no reciters listed".into()));
        }
        if self.words.is_empty() {
            return Err(ManifestError::Invalid("no words listed".into()));
        }

        let mut ids = HashSet::new();
        for reciter in &self.reciters {
            if !is_plain_segment(&reciter.id) {
                return Err(ManifestError::Invalid(format!(
                    "reciter id {:?} must be a single path segment",
                    reciter.id
                )));
            }
            if !ids.insert(reciter.id.as_str()) {
                return Err(ManifestError::Invalid(format!(
                    "duplicate reciter id {:?}",
                    reciter.id
                )));
            }
            let freq = reciter.options.tone_frequency_hz;
            if !freq.is_finite() || freq <= 0.0 {
                return Err(ManifestError::Invalid(format!(
                    "reciter {:?}: tone_frequency_hz must be positive, got {freq}",
                    reciter.id
                )));
            }
        }

        let mut filenames = HashSet::new();
        for word in &self.words {
            check_relative_filename(&word.relative_filename)?;
            if !filenames.insert(word.relative_filename.as_str()) {
                return Err(ManifestError::Invalid(format!(
                    "duplicate filename {:?}",
                    word.relative_filename
                )));
            }
        }
        Ok(())
    }

    /// Reciters that take part in generation, in manifest order.
    pub fn active_reciters(&self) -> impl Iterator<Item = &Reciter> {
        self.reciters.iter().filter(|r| r.enabled)
    }

    pub fn reciter(&self, id: &str) -> Option<&Reciter> {
        self.reciters.iter().find(|r| r.id == id)
    }

    /// The word list as seen from one reciter's namespace.
    pub fn assets_for<'a>(&'a self, reciter: &'a Reciter) -> impl Iterator<Item = WordAsset> + 'a {
        self.words.iter().map(move |word| WordAsset {
            source_text: word.source_text.clone(),
            destination_path: Path::new(&reciter.id).join(&word.relative_filename),
            reciter: reciter.id.clone(),
        })
    }

    /// Every destination of every enabled reciter, reciter-major.
    pub fn destinations(&self) -> Vec<WordAsset> {
        self.active_reciters()
            .flat_map(|reciter| self.assets_for(reciter))
            .collect()
    }
}

fn is_plain_segment(s: &str) -> bool {
    let mut components = Path::new(s).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn check_relative_filename(name: &str) -> Result<(), ManifestError> {
    let path = Path::new(name);
    if !path.components().all(|c| matches!(c, Component::Normal(_))) || name.is_empty() {
        return Err(ManifestError::Invalid(format!(
            "{name:?} must be a relative path without '..'"
        )));
    }
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ARTIFACT_EXTENSION));
    if !ext_ok {
        return Err(ManifestError::Invalid(format!(
            "{name:?} must end in .{ARTIFACT_EXTENSION}"
        )));
    }
    Ok(())
}
