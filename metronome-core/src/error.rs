//! Error types for the metronome core

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading sounds, parsing tempo input or
/// opening the audio output.
#[derive(Error, Debug)]
pub enum MetronomeError {
    #[error("Invalid BPM {input:?}: expected an integer between {min} and {max}")]
    InvalidBpm { input: String, min: u32, max: u32 },

    #[error("Sound asset not found: {}", .0.display())]
    MissingSound(PathBuf),

    #[error("Failed to decode sound asset {}: {source}", .path.display())]
    SoundDecode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("No output device available")]
    NoOutputDevice,

    #[error("No suitable f32 output format found")]
    UnsupportedOutputFormat,
}
