// metronome-core/src/lib.rs

//! The core logic for the metronome.
//! This crate owns tempo arithmetic, the beat scheduler, sound loading
//! and audio output. It is completely headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod sound;
pub mod tempo;

pub use config::MetronomeConfig;
pub use error::MetronomeError;
pub use scheduler::{Playback, RunState, TempoScheduler, Tick, Timer};
pub use sound::{Clip, SoundBank, SoundId};
pub use tempo::Bpm;
