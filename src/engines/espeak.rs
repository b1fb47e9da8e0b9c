//! Speech tier backed by the espeak-ng command line tool.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! A bundled binary and data directory can be used instead through
//! [`EspeakConfig`].

use std::borrow::Cow;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::EspeakConfig;
use crate::engines::raw::WAV_HEADER_LEN;
use crate::error::BackendError;
use crate::manifest::ReciterOptions;
use crate::{Artifact, SynthesisBackend, SynthesisResult, Tier};

/// Speaking rate for regular delivery, in words per minute.
pub const NORMAL_WORDS_PER_MINUTE: u32 = 120;

/// Speaking rate for reciters flagged `slow`.
pub const SLOW_WORDS_PER_MINUTE: u32 = 90;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Renders words through `espeak-ng --stdout`.
#[derive(Debug, Clone)]
pub struct EspeakBackend {
    espeak: EspeakConfig,
    timeout: Duration,
}

impl EspeakBackend {
    pub fn new(espeak: EspeakConfig, timeout: Duration) -> Self {
        Self { espeak, timeout }
    }

    /// Create the backend only if the binary can actually be run.
    pub fn probe(espeak: EspeakConfig, timeout: Duration) -> Result<Self, BackendError> {
        let backend = Self::new(espeak, timeout);
        let output = backend
            .base_command()
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| spawn_error(backend.program(), e))?;

        if !output.status.success() {
            return Err(BackendError::Unavailable(format!(
                "{} --version exited with code {:?}",
                backend.program().display(),
                output.status.code()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        log::info!(
            "Speech tier using {}: {}",
            backend.program().display(),
            version.lines().next().unwrap_or("").trim()
        );
        Ok(backend)
    }

    fn program(&self) -> &Path {
        self.espeak
            .bin_path
            .as_deref()
            .unwrap_or_else(|| Path::new("espeak-ng"))
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        if let Some(data) = &self.espeak.data_path {
            cmd.env("ESPEAK_DATA_PATH", data);
        }
        cmd
    }

    fn run_espeak(&self, text: &str, options: &ReciterOptions) -> Result<Vec<u8>, BackendError> {
        let mut cmd = self.base_command();
        cmd.args(speech_args(options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        log::debug!("Running {cmd:?}");

        let mut child = cmd.spawn().map_err(|e| spawn_error(self.program(), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(canonicalize_stdin_payload(text).as_bytes())?;
        }

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, self.timeout)?;
        let audio = join_drain(stdout)?;

        if !status.success() {
            let stderr = join_drain(stderr).unwrap_or_default();
            return Err(BackendError::SynthesisFailed(format!(
                "espeak-ng exited with code {:?}: {}",
                status.code(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        Ok(audio)
    }
}

impl SynthesisBackend for EspeakBackend {
    fn tier(&self) -> Tier {
        Tier::Speech
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn synthesize(&mut self, text: &str, options: &ReciterOptions) -> SynthesisResult {
        if text.trim().is_empty() {
            return Err(BackendError::SynthesisFailed("empty text".into()));
        }

        let artifact = Artifact::from_wav_bytes(self.run_espeak(text, options)?)?;
        if artifact.len() <= WAV_HEADER_LEN {
            return Err(BackendError::SynthesisFailed(format!(
                "espeak-ng produced no samples for {text:?}"
            )));
        }
        Ok(artifact)
    }
}

/// Command line for one word: WAV on stdout, UTF-8 text on stdin.
pub fn speech_args(options: &ReciterOptions) -> Vec<String> {
    let rate = if options.slow {
        SLOW_WORDS_PER_MINUTE
    } else {
        NORMAL_WORDS_PER_MINUTE
    };
    vec![
        "--stdout".to_string(),
        "--stdin".to_string(),
        "-b".to_string(),
        "1".to_string(),
        "-v".to_string(),
        options.language.clone(),
        "-s".to_string(),
        rate.to_string(),
    ]
}

fn spawn_error(program: &Path, e: std::io::Error) -> BackendError {
    if e.kind() == std::io::ErrorKind::NotFound {
        BackendError::Unavailable(format!("{} not found", program.display()))
    } else {
        BackendError::Io(e)
    }
}

// espeak-ng treats stdin as line-oriented input; the last word is only
// spoken reliably when the payload ends in a newline.
fn canonicalize_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_drain(handle: Drain) -> Result<Vec<u8>, BackendError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| BackendError::SynthesisFailed("pipe reader panicked".into()))?
            .map_err(BackendError::Io),
        None => Ok(Vec::new()),
    }
}

/// Wait for `child`, killing it once `timeout` has elapsed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, BackendError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BackendError::TimedOut(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
