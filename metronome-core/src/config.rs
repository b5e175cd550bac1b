//! Startup configuration for the metronome.

use std::path::PathBuf;

use crate::sound::SoundId;
use crate::tempo::{Bpm, DEFAULT_BPM};

/// Default click volume (0-100).
pub const DEFAULT_VOLUME: u8 = 50;

/// Sample rate requested from the output device.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Values a fresh scheduler and audio pipeline start from.
#[derive(Debug, Clone)]
pub struct MetronomeConfig {
    /// Tempo shown in the BPM field and used until the user changes it
    pub default_bpm: Bpm,
    /// Click volume (0 - 100)
    pub default_volume: u8,
    /// Sound selected at startup
    pub default_sound: SoundId,
    /// Directory holding `Click1.wav` and `Click2.wav`
    pub asset_dir: PathBuf,
    /// Preferred output sample rate in Hz
    pub target_sample_rate: u32,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            default_bpm: DEFAULT_BPM,
            default_volume: DEFAULT_VOLUME,
            default_sound: SoundId::default(),
            asset_dir: PathBuf::from("assets"),
            target_sample_rate: TARGET_SAMPLE_RATE,
        }
    }
}
