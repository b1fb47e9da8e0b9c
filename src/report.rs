use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::Tier;

/// Terminal state of one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// A valid artifact was already present.
    Skipped,
    /// Freshly written by the given tier.
    Written(Tier),
    /// Every tier failed. Not reachable while the raw tier is in the chain.
    Exhausted,
    /// An artifact was produced but could not be stored.
    WriteFailed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Exhausted | Outcome::WriteFailed(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DestinationRecord {
    pub reciter: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Overall verdict of a run, for mapping onto exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every destination holds an artifact.
    Complete,
    /// Some destinations failed, others hold an artifact.
    Degraded,
    /// Nothing was produced or found.
    Failed,
}

/// Counts and per-destination outcomes for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub by_tier: BTreeMap<Tier, usize>,
    pub records: Vec<DestinationRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reciter: &str, path: PathBuf, outcome: Outcome) {
        match &outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Written(tier) => {
                self.created += 1;
                *self.by_tier.entry(*tier).or_default() += 1;
            }
            Outcome::Exhausted | Outcome::WriteFailed(_) => self.failed += 1,
        }
        self.records.push(DestinationRecord {
            reciter: reciter.to_string(),
            path,
            outcome,
        });
    }

    pub fn total(&self) -> usize {
        self.created + self.skipped + self.failed
    }

    /// Number of destinations written by `tier` in this run.
    pub fn created_by(&self, tier: Tier) -> usize {
        self.by_tier.get(&tier).copied().unwrap_or(0)
    }

    /// Destinations written this run by a tier other than speech.
    pub fn degraded(&self) -> usize {
        self.by_tier
            .iter()
            .filter(|(tier, _)| !tier.is_high_fidelity())
            .map(|(_, count)| count)
            .sum()
    }

    /// Paths holding placeholders that should eventually be replaced by real
    /// recordings.
    pub fn placeholders(&self) -> impl Iterator<Item = &DestinationRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Written(tier) if !tier.is_high_fidelity()))
    }

    pub fn status(&self) -> RunStatus {
        if self.failed == 0 && self.total() > 0 {
            RunStatus::Complete
        } else if self.created + self.skipped > 0 {
            RunStatus::Degraded
        } else {
            RunStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == RunStatus::Complete
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} destinations: {} created, {} skipped, {} failed",
            self.total(),
            self.created,
            self.skipped,
            self.failed
        )?;
        write!(
            f,
            "created by tier: speech {}, tone {}, silence {}, raw {}",
            self.created_by(Tier::Speech),
            self.created_by(Tier::Tone),
            self.created_by(Tier::Silence),
            self.created_by(Tier::Raw)
        )?;
        if self.degraded() > 0 {
            write!(
                f,
                "\n{} placeholder(s) written; replace them with real recordings for better audio",
                self.degraded()
            )?;
        }
        Ok(())
    }
}
