use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;

use crate::storage::MIN_VALID_BYTES;

/// Location of the espeak-ng binary and its voice data.
///
/// Either path can be `None` to fall back to the system default
/// (`espeak-ng` from PATH, the compiled-in data directory).
#[derive(Debug, Clone, Default)]
pub struct EspeakConfig {
    pub bin_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

/// Settings for one generator run.
///
/// ```rust
/// use std::time::Duration;
/// use recite_assets::GeneratorConfigBuilder;
///
/// let config = GeneratorConfigBuilder::default()
///     .base_dir("/tmp/qaris")
///     .backend_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(config.min_valid_bytes, 1000);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct GeneratorConfig {
    /// Root of the storage tree; each reciter gets a subdirectory.
    #[builder(setter(into))]
    pub base_dir: PathBuf,
    /// Files at least this large are considered valid and skipped.
    pub min_valid_bytes: u64,
    /// Upper bound for one external backend call.
    pub backend_timeout: Duration,
    /// Sample rate for in-process generated audio.
    pub sample_rate: u32,
    /// Length of the tone placeholder.
    pub tone_duration: Duration,
    /// Length of the silence placeholder.
    pub silence_duration: Duration,
    pub espeak: EspeakConfig,
    /// Leave the speech tier out of the cascade entirely.
    pub disable_speech: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("qaris"),
            min_valid_bytes: MIN_VALID_BYTES,
            backend_timeout: Duration::from_secs(10),
            sample_rate: 22_050,
            tone_duration: Duration::from_millis(400),
            silence_duration: Duration::from_millis(300),
            espeak: EspeakConfig::default(),
            disable_speech: false,
        }
    }
}
