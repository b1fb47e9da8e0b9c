//! Last-resort tier: a fixed, silent WAV file assembled from constants.
//!
//! Nothing here touches an audio library, so this tier cannot fail.

use crate::manifest::ReciterOptions;
use crate::storage::MIN_VALID_BYTES;
use crate::{Artifact, SynthesisBackend, SynthesisResult, Tier};

/// Size of a canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

const SAMPLE_RATE: u32 = 8_000;
const BITS_PER_SAMPLE: u16 = 16;

/// Zeroed PCM payload; 1024 bytes is 64 ms of 16-bit mono at 8 kHz.
const DATA_LEN: u32 = 1024;

#[rustfmt::skip]
const HEADER: [u8; WAV_HEADER_LEN] = [
    b'R', b'I', b'F', b'F',
    0x24, 0x04, 0x00, 0x00, // 36 + DATA_LEN
    b'W', b'A', b'V', b'E',
    b'f', b'm', b't', b' ',
    0x10, 0x00, 0x00, 0x00, // fmt chunk size
    0x01, 0x00,             // PCM
    0x01, 0x00,             // mono
    0x40, 0x1f, 0x00, 0x00, // 8000 Hz
    0x80, 0x3e, 0x00, 0x00, // byte rate 16000
    0x02, 0x00,             // block align
    0x10, 0x00,             // 16 bits
    b'd', b'a', b't', b'a',
    0x00, 0x04, 0x00, 0x00, // DATA_LEN
];

const _: () = assert!(WAV_HEADER_LEN as u64 + DATA_LEN as u64 >= MIN_VALID_BYTES);

/// The complete fallback file.
pub fn silent_wav_bytes() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + DATA_LEN as usize);
    bytes.extend_from_slice(&HEADER);
    bytes.resize(WAV_HEADER_LEN + DATA_LEN as usize, 0);
    bytes
}

/// Writes [`silent_wav_bytes`] for every word.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytesBackend;

impl SynthesisBackend for RawBytesBackend {
    fn tier(&self) -> Tier {
        Tier::Raw
    }

    fn name(&self) -> &str {
        "raw-bytes"
    }

    fn synthesize(&mut self, _text: &str, _options: &ReciterOptions) -> SynthesisResult {
        Ok(Artifact {
            bytes: silent_wav_bytes(),
            spec: hound::WavSpec {
                channels: 1,
                sample_rate: SAMPLE_RATE,
                bits_per_sample: BITS_PER_SAMPLE,
                sample_format: hound::SampleFormat::Int,
            },
        })
    }
}
