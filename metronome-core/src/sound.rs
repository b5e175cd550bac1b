//! # Sound Module
//!
//! The set of click sounds the metronome can play and the bank that holds
//! them decoded in memory.
//!
//! Sounds are loaded once at startup from WAV files. Any channel layout is
//! folded down to mono and integer PCM is normalized to `[-1.0, 1.0]`, so the
//! audio callback only ever deals with one kind of buffer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hound::{SampleFormat, WavReader};
use tracing::info;

use crate::error::MetronomeError;

/// Identifier of a playable click sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SoundId {
    #[default]
    Click,
    Tick,
}

impl SoundId {
    /// Every sound the picker offers, in display order.
    pub const ALL: [SoundId; 2] = [SoundId::Click, SoundId::Tick];

    /// File name of the bundled asset for this sound.
    pub fn asset_file(self) -> &'static str {
        match self {
            SoundId::Click => "Click1.wav",
            SoundId::Tick => "Click2.wav",
        }
    }

    fn index(self) -> usize {
        match self {
            SoundId::Click => 0,
            SoundId::Tick => 1,
        }
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SoundId::Click => "Click",
            SoundId::Tick => "Tick",
        };
        f.write_str(name)
    }
}

/// A decoded mono sound.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Mono samples in `[-1.0, 1.0]`
    pub samples: Vec<f32>,
    /// Sample rate of `samples` in Hz
    pub sample_rate: u32,
}

impl Clip {
    /// Decodes a WAV file into a mono clip.
    pub fn from_wav(path: &Path) -> Result<Self, MetronomeError> {
        if !path.is_file() {
            return Err(MetronomeError::MissingSound(path.to_path_buf()));
        }
        let decode_err = |source| MetronomeError::SoundDecode {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = WavReader::open(path).map_err(decode_err)?;
        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(decode_err)?,
            SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(decode_err)?
            }
        };

        Ok(Self {
            samples: downmix(&interleaved, spec.channels as usize),
            sample_rate: spec.sample_rate,
        })
    }

    /// Length of the clip in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Averages interleaved frames into a single channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// All playable sounds, decoded and shared with the audio thread.
#[derive(Debug, Clone)]
pub struct SoundBank {
    clips: [Arc<Clip>; 2],
}

impl SoundBank {
    /// Loads the asset of every [`SoundId`] from `dir`.
    ///
    /// Fails on the first missing or undecodable file.
    pub fn load(dir: &Path) -> Result<Self, MetronomeError> {
        let load = |id: SoundId| -> Result<Arc<Clip>, MetronomeError> {
            let path: PathBuf = dir.join(id.asset_file());
            let clip = Clip::from_wav(&path)?;
            info!(
                "Loaded sound {} from {} ({:.0} ms @ {} Hz)",
                id,
                path.display(),
                clip.duration_secs() * 1000.0,
                clip.sample_rate
            );
            Ok(Arc::new(clip))
        };

        Ok(Self {
            clips: [load(SoundId::Click)?, load(SoundId::Tick)?],
        })
    }

    /// Shared handle to the clip for `id`. Every known id has one.
    pub fn clip(&self, id: SoundId) -> Arc<Clip> {
        Arc::clone(&self.clips[id.index()])
    }
}
