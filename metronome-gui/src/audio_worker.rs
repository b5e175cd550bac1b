//! # Audio Worker
//!
//! Owns the dedicated audio thread. The CPAL stream lives on that thread
//! for its whole life; the GUI only holds a channel sender wrapped in
//! [`ChannelPlayback`], which is the scheduler's playback capability.

use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use metronome_core::audio::{self, PlayCommand};
use metronome_core::{Playback, SoundBank, SoundId};
use tracing::{error, info, warn};

/// Audio worker thread management structure.
///
/// Dropping the worker signals the thread and waits for it to release the
/// output device.
#[derive(Debug)]
pub struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AudioWorker {
    /// Spawns the audio thread and returns the worker together with the
    /// playback handle that feeds it.
    pub fn spawn(sounds: SoundBank, target_rate: u32) -> (Self, ChannelPlayback) {
        let (command_tx, command_rx) = crossbeam_channel::unbounded::<PlayCommand>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let thread_handle = thread::spawn(move || {
            info!("Audio thread starting...");
            let (stream, sample_rate) = match audio::start_audio_output(command_rx, target_rate) {
                Ok(tuple) => tuple,
                Err(e) => {
                    error!("Could not start audio output, running silently: {:#}", e);
                    return;
                }
            };
            info!("Audio output running at {} Hz", sample_rate);

            // Park until the GUI goes away.
            let _ = shutdown_rx.recv();

            info!("Stopping audio stream...");
            drop(stream);
            info!("Audio thread finished");
        });

        let worker = Self {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        };
        (worker, ChannelPlayback::new(sounds, command_tx))
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Audio thread panicked during shutdown");
            }
        }
    }
}

/// Sends play requests to the audio thread. Never blocks.
#[derive(Debug)]
pub struct ChannelPlayback {
    sounds: SoundBank,
    command_tx: Sender<PlayCommand>,
    // Log a dead audio thread once, not on every beat.
    warned: bool,
}

impl ChannelPlayback {
    /// Creates a playback handle feeding `command_tx`.
    ///
    /// # Arguments
    /// * `sounds` - Decoded clips looked up on every beat
    /// * `command_tx` - Channel read by the audio stream callback
    pub fn new(sounds: SoundBank, command_tx: Sender<PlayCommand>) -> Self {
        Self {
            sounds,
            command_tx,
            warned: false,
        }
    }
}

impl Playback for ChannelPlayback {
    fn play(&mut self, sound: SoundId, gain: f32) {
        let command = PlayCommand {
            clip: self.sounds.clip(sound),
            gain,
        };
        if self.command_tx.send(command).is_err() && !self.warned {
            warn!("Audio output unavailable, beat not played");
            self.warned = true;
        }
    }
}
