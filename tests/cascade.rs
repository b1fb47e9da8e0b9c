use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use recite_assets::engines::raw::silent_wav_bytes;
use recite_assets::storage::MIN_VALID_BYTES;
use recite_assets::{
    generate, Artifact, BackendError, Cascade, GeneratorConfig, GeneratorConfigBuilder, Manifest,
    ManifestError, Outcome, ReciterOptions, RunStatus, SynthesisBackend, SynthesisResult, Tier,
    Waveform,
};

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Unavailable,
}

/// Backend whose result is fixed up front; counts how often it is asked.
struct Scripted {
    tier: Tier,
    behavior: Behavior,
    calls: Rc<Cell<usize>>,
}

impl Scripted {
    fn boxed(tier: Tier, behavior: Behavior) -> (Box<dyn SynthesisBackend>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let backend = Scripted {
            tier,
            behavior,
            calls: Rc::clone(&calls),
        };
        (Box::new(backend), calls)
    }
}

/// Distinct, valid audio per tier so tests can tell who wrote a file.
fn stub_artifact(tier: Tier) -> Artifact {
    let freq = match tier {
        Tier::Speech => 150.0,
        Tier::Tone => 450.0,
        Tier::Silence => 20.0,
        Tier::Raw => 1.0,
    };
    Waveform::sine(freq, 0.5, 0.1, 16_000).encode_wav().unwrap()
}

impl SynthesisBackend for Scripted {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn name(&self) -> &str {
        self.tier.as_str()
    }

    fn synthesize(&mut self, _text: &str, _options: &ReciterOptions) -> SynthesisResult {
        self.calls.set(self.calls.get() + 1);
        match self.behavior {
            Behavior::Succeed => Ok(stub_artifact(self.tier)),
            Behavior::Fail => Err(BackendError::SynthesisFailed("scripted failure".into())),
            Behavior::Unavailable => Err(BackendError::Unavailable("scripted".into())),
        }
    }
}

fn manifest(reciters: &[&str], words: usize) -> Manifest {
    let reciters: Vec<String> = reciters
        .iter()
        .map(|id| format!(r#"{{ "id": "{id}", "display_name": "{id}" }}"#))
        .collect();
    let words: Vec<String> = (1..=words)
        .map(|i| {
            format!(r#"{{ "source_text": "word{i}", "relative_filename": "001_001_{i:03}.wav" }}"#)
        })
        .collect();
    Manifest::from_json(&format!(
        r#"{{ "reciters": [{}], "words": [{}] }}"#,
        reciters.join(","),
        words.join(",")
    ))
    .unwrap()
}

fn config(base: &Path) -> GeneratorConfig {
    GeneratorConfigBuilder::default()
        .base_dir(base)
        .build()
        .unwrap()
}

fn speech_only(base: &Path) -> Cascade {
    let (speech, _) = Scripted::boxed(Tier::Speech, Behavior::Succeed);
    Cascade::new(config(base), vec![speech])
}

fn all_paths(base: &Path, manifest: &Manifest) -> Vec<PathBuf> {
    manifest
        .destinations()
        .iter()
        .map(|a| base.join(&a.destination_path))
        .collect()
}

#[test]
fn fresh_run_creates_every_destination() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["abdul_basit", "mishary"], 3);

    let report = speech_only(dir.path()).run(&manifest);

    assert_eq!((report.created, report.skipped, report.failed), (6, 0, 0));
    assert_eq!(report.created_by(Tier::Speech), 6);
    assert_eq!(report.status(), RunStatus::Complete);
    for path in all_paths(dir.path(), &manifest) {
        assert!(path.is_file(), "{} missing", path.display());
    }
}

#[test]
fn second_run_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["abdul_basit", "mishary"], 3);

    speech_only(dir.path()).run(&manifest);
    let report = speech_only(dir.path()).run(&manifest);

    assert_eq!(report.created, 0);
    assert_eq!(report.skipped, manifest.destinations().len());
    assert!(report.records.iter().all(|r| r.outcome == Outcome::Skipped));
}

#[test]
fn prepopulated_destinations_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["abdul_basit", "mishary"], 3);
    let paths = all_paths(dir.path(), &manifest);

    let recording = vec![7u8; 2 * MIN_VALID_BYTES as usize];
    for path in paths.iter().step_by(2) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, &recording).unwrap();
    }

    let report = speech_only(dir.path()).run(&manifest);

    assert_eq!((report.created, report.skipped, report.failed), (3, 3, 0));
    for path in paths.iter().step_by(2) {
        assert_eq!(fs::read(path).unwrap(), recording);
    }
}

#[test]
fn threshold_boundary_decides_regeneration() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["sudais"], 2);
    let paths = all_paths(dir.path(), &manifest);
    fs::create_dir_all(dir.path().join("sudais")).unwrap();
    fs::write(&paths[0], vec![1u8; MIN_VALID_BYTES as usize - 1]).unwrap();
    fs::write(&paths[1], vec![1u8; MIN_VALID_BYTES as usize]).unwrap();

    let report = speech_only(dir.path()).run(&manifest);

    assert_eq!(report.records[0].outcome, Outcome::Written(Tier::Speech));
    assert_eq!(report.records[1].outcome, Outcome::Skipped);
}

#[test]
fn failed_speech_falls_back_to_tone() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["mishary"], 1);
    let (speech, speech_calls) = Scripted::boxed(Tier::Speech, Behavior::Fail);
    let (tone, tone_calls) = Scripted::boxed(Tier::Tone, Behavior::Succeed);
    let (silence, silence_calls) = Scripted::boxed(Tier::Silence, Behavior::Succeed);

    let report = Cascade::new(config(dir.path()), vec![speech, tone, silence]).run(&manifest);

    assert_eq!(report.records[0].outcome, Outcome::Written(Tier::Tone));
    assert_eq!(report.created_by(Tier::Speech), 0);
    assert_eq!((speech_calls.get(), tone_calls.get(), silence_calls.get()), (1, 1, 0));

    let written = fs::read(&all_paths(dir.path(), &manifest)[0]).unwrap();
    assert_eq!(written, stub_artifact(Tier::Tone).bytes);
}

#[test]
fn all_tiers_failing_still_writes_raw_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["mishary"], 1);
    let backends = vec![
        Scripted::boxed(Tier::Speech, Behavior::Fail).0,
        Scripted::boxed(Tier::Tone, Behavior::Fail).0,
        Scripted::boxed(Tier::Silence, Behavior::Fail).0,
    ];

    let report = Cascade::new(config(dir.path()), backends).run(&manifest);

    assert_eq!((report.created, report.failed), (1, 0));
    assert_eq!(report.records[0].outcome, Outcome::Written(Tier::Raw));
    let written = fs::read(&all_paths(dir.path(), &manifest)[0]).unwrap();
    assert_eq!(written, silent_wav_bytes());
    assert!(written.len() as u64 >= MIN_VALID_BYTES);
}

#[test]
fn unavailable_tier_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["abdul_basit", "mishary"], 3);
    let (speech, speech_calls) = Scripted::boxed(Tier::Speech, Behavior::Unavailable);
    let (tone, tone_calls) = Scripted::boxed(Tier::Tone, Behavior::Succeed);

    let mut cascade = Cascade::new(config(dir.path()), vec![speech, tone]);
    let report = cascade.run(&manifest);

    assert_eq!(speech_calls.get(), 1);
    assert_eq!(tone_calls.get(), 6);
    assert_eq!(report.created_by(Tier::Tone), 6);
    assert_eq!(cascade.backend_names(), vec!["tone", "raw-bytes"]);
}

#[test]
fn transient_failures_are_retried_per_destination() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(&["mishary"], 3);
    let (speech, speech_calls) = Scripted::boxed(Tier::Speech, Behavior::Fail);

    Cascade::new(config(dir.path()), vec![speech]).run(&manifest);

    assert_eq!(speech_calls.get(), 3);
}

#[test]
fn unwritable_storage_is_reported_per_destination() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("qaris");
    fs::write(&base, b"a file where the storage root should be").unwrap();
    let manifest = manifest(&["abdul_basit", "mishary"], 2);

    let report = speech_only(&base).run(&manifest);

    assert_eq!((report.created, report.failed), (0, 4));
    assert_eq!(report.records.len(), 4);
    assert!(report
        .records
        .iter()
        .all(|r| matches!(r.outcome, Outcome::WriteFailed(_))));
    assert_eq!(report.status(), RunStatus::Failed);
}

#[test]
fn bundled_manifest_is_fully_covered_without_speech() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/audio_manifest.json");
    let config = GeneratorConfigBuilder::default()
        .base_dir(dir.path())
        .disable_speech(true)
        .build()
        .unwrap();

    let report = generate(&manifest_path, config).unwrap();

    let manifest = Manifest::from_path(&manifest_path).unwrap();
    assert_eq!(manifest.reciters.len(), 3);
    assert_eq!(report.created, manifest.destinations().len());
    assert_eq!(report.created_by(Tier::Tone), report.created);
    for path in all_paths(dir.path(), &manifest) {
        let len = fs::metadata(&path).unwrap().len();
        assert!(len >= MIN_VALID_BYTES, "{} is only {len} bytes", path.display());
    }
}

#[test]
fn missing_manifest_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate(&dir.path().join("audio_manifest.json"), config(dir.path())).unwrap_err();
    assert!(matches!(err, ManifestError::Missing(_)));
    assert!(err.to_string().contains("manifest not found"));
}
