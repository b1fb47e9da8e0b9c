use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use recite_assets::config::EspeakConfig;
use recite_assets::storage::{needs_regeneration, MIN_VALID_BYTES};
use recite_assets::{Cascade, GeneratorConfigBuilder, Manifest, RunStatus};

/// Generate per-word recitation audio, falling back to placeholders when no
/// speech backend is available.
#[derive(Parser, Debug)]
#[command(name = "recite-assets", version, about)]
struct Cli {
    /// Manifest listing reciters and words
    #[arg(long, env = "RECITE_MANIFEST", default_value = "data/audio_manifest.json")]
    manifest: PathBuf,

    /// Storage root; one subdirectory per reciter
    #[arg(short, long, env = "RECITE_OUTPUT", default_value = "qaris")]
    output: PathBuf,

    /// Files at least this large are kept as they are
    #[arg(long, default_value_t = MIN_VALID_BYTES)]
    min_bytes: u64,

    /// Give up on a single speech call after this many seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// espeak-ng binary to use instead of the one on PATH
    #[arg(long, env = "ESPEAK_NG_BIN")]
    espeak: Option<PathBuf>,

    /// espeak-ng data directory
    #[arg(long, env = "ESPEAK_DATA_PATH")]
    espeak_data: Option<PathBuf>,

    /// Skip the speech tier and go straight to placeholders
    #[arg(long)]
    no_speech: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// List destinations and whether they are present, without generating
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::Degraded) => ExitCode::from(2),
        Ok(RunStatus::Failed) => ExitCode::from(1),
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<RunStatus, Box<dyn std::error::Error>> {
    let manifest = Manifest::from_path(&cli.manifest)?;

    let config = GeneratorConfigBuilder::default()
        .base_dir(cli.output)
        .min_valid_bytes(cli.min_bytes)
        .backend_timeout(Duration::from_secs(cli.timeout_secs))
        .espeak(EspeakConfig {
            bin_path: cli.espeak,
            data_path: cli.espeak_data,
        })
        .disable_speech(cli.no_speech)
        .build()?;

    if cli.list {
        for reciter in manifest.active_reciters() {
            println!("{} ({})", reciter.id, reciter.display_name);
            for (word, asset) in manifest.words.iter().zip(manifest.assets_for(reciter)) {
                let path = config.base_dir.join(&asset.destination_path);
                let state = if needs_regeneration(&path, config.min_valid_bytes) {
                    "missing"
                } else {
                    "present"
                };
                println!(
                    "  {:<8} {}  {} {}",
                    state,
                    path.display(),
                    word.source_text,
                    word.transliteration.as_deref().unwrap_or("")
                );
            }
        }
        return Ok(RunStatus::Complete);
    }

    let mut cascade = Cascade::with_default_backends(config);
    let report = cascade.run(&manifest);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
        for record in report.placeholders() {
            println!("  placeholder: {}", record.path.display());
        }
    }

    Ok(report.status())
}
