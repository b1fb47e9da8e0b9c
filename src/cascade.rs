//! The fallback cascade: walks every destination through the tiers.

use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::engines::{self, raw::RawBytesBackend};
use crate::manifest::{Manifest, Reciter, WordAsset};
use crate::report::{Outcome, RunReport};
use crate::storage::{needs_regeneration, write_atomic};
use crate::{Artifact, SynthesisBackend, Tier};

struct Link {
    backend: Box<dyn SynthesisBackend>,
    disabled: bool,
}

/// Chain of synthesis backends plus the storage they write into.
///
/// Backends are tried in the order given; [`RawBytesBackend`] is always
/// appended as the final link so that every destination gets written.
pub struct Cascade {
    config: GeneratorConfig,
    chain: Vec<Link>,
}

impl std::fmt::Debug for Cascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cascade")
            .field("config", &self.config)
            .field("chain", &self.backend_names())
            .finish()
    }
}

impl Cascade {
    pub fn new(config: GeneratorConfig, backends: Vec<Box<dyn SynthesisBackend>>) -> Self {
        let chain = backends
            .into_iter()
            .chain(std::iter::once(
                Box::new(RawBytesBackend) as Box<dyn SynthesisBackend>
            ))
            .map(|backend| Link {
                backend,
                disabled: false,
            })
            .collect();
        Self { config, chain }
    }

    /// Speech (if espeak-ng is usable), tone, silence, raw.
    pub fn with_default_backends(config: GeneratorConfig) -> Self {
        let backends = engines::default_backends(&config);
        Self::new(config, backends)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Names of the backends still in play, in cascade order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.chain
            .iter()
            .filter(|link| !link.disabled)
            .map(|link| link.backend.name())
            .collect()
    }

    /// Absolute location of an asset under the configured storage root.
    pub fn resolve(&self, asset: &WordAsset) -> PathBuf {
        self.config.base_dir.join(&asset.destination_path)
    }

    /// Process every destination of every enabled reciter.
    pub fn run(&mut self, manifest: &Manifest) -> RunReport {
        let mut report = RunReport::new();
        log::info!(
            "Generating into {} with tiers [{}]",
            self.config.base_dir.display(),
            self.backend_names().join(" -> ")
        );

        for reciter in manifest.active_reciters() {
            log::info!("Reciter {} ({})", reciter.id, reciter.display_name);
            for asset in manifest.assets_for(reciter) {
                let outcome = self.process(reciter, &asset);
                report.record(&asset.reciter, asset.destination_path, outcome);
            }
        }

        log::info!(
            "Done: {} created, {} skipped, {} failed",
            report.created,
            report.skipped,
            report.failed
        );
        report
    }

    /// Check, synthesize and write one destination.
    pub fn process(&mut self, reciter: &Reciter, asset: &WordAsset) -> Outcome {
        let path = self.resolve(asset);

        if !needs_regeneration(&path, self.config.min_valid_bytes) {
            log::debug!("Skipping {}: already present", path.display());
            return Outcome::Skipped;
        }

        let Some((tier, artifact)) = self.synthesize(reciter, &asset.source_text) else {
            log::error!("Every tier failed for {}", path.display());
            return Outcome::Exhausted;
        };

        match write_atomic(&path, &artifact.bytes) {
            Ok(()) => {
                log::info!(
                    "Created {} via {tier} ({} bytes, {} Hz)",
                    path.display(),
                    artifact.len(),
                    artifact.spec.sample_rate
                );
                Outcome::Written(tier)
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                Outcome::WriteFailed(e.to_string())
            }
        }
    }

    /// Try each enabled link in order and return the first success.
    fn synthesize(&mut self, reciter: &Reciter, text: &str) -> Option<(Tier, Artifact)> {
        for link in self.chain.iter_mut().filter(|link| !link.disabled) {
            match link.backend.synthesize(text, &reciter.options) {
                Ok(artifact) => return Some((link.backend.tier(), artifact)),
                Err(e) if e.disables_tier() => {
                    log::warn!(
                        "{} unavailable, disabling it for this run: {e}",
                        link.backend.name()
                    );
                    link.disabled = true;
                }
                Err(e) => {
                    log::warn!(
                        "{} failed for {text:?} ({}): {e}; falling back",
                        link.backend.name(),
                        reciter.id
                    );
                }
            }
        }
        None
    }
}
