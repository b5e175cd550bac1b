//! # Audio Output Module
//!
//! This module plays click sounds through the default output device using
//! CPAL (Cross-Platform Audio Library).
//!
//! The GUI never touches the stream directly. It sends [`PlayCommand`]s over
//! a channel and the stream callback picks the newest one up on its next
//! buffer. Only one sound plays at a time: a new command replaces whatever
//! is still ringing.

use std::sync::Arc;

use anyhow::Result;
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;
use tracing::{error, info};

use crate::error::MetronomeError;
use crate::sound::Clip;

/// Request to start playing `clip` at `gain` (0.0 - 1.0).
#[derive(Debug, Clone)]
pub struct PlayCommand {
    pub clip: Arc<Clip>,
    pub gain: f32,
}

/// Starts the output stream on the default output device.
///
/// # Arguments
/// * `commands` - Channel the stream callback drains for new sounds
/// * `target_rate` - Preferred device sample rate in Hz
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and device sample rate
/// * `Err(e)` - No device, no `f32` format, or the stream failed to start
pub fn start_audio_output(commands: Receiver<PlayCommand>, target_rate: u32) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(MetronomeError::NoOutputDevice)?;

    info!("Using audio output device: {}", device.name()?);

    let configs = device.supported_output_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, target_rate)
        .ok_or(MetronomeError::UnsupportedOutputFormat)?;

    let sample_rate = supported_config
        .max_sample_rate()
        .0
        .min(target_rate)
        .max(supported_config.min_sample_rate().0);
    let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    info!("Selected output: {} Hz, {} channel(s)", sample_rate, channels);

    let err_fn = |err| error!("An error occurred on the audio output stream: {}", err);

    let mut voice: Option<Voice> = None;

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Only the most recent request matters.
            while let Ok(command) = commands.try_recv() {
                voice = Some(Voice::new(command, sample_rate));
            }
            match voice.as_mut() {
                Some(v) => {
                    v.render(data, channels);
                    if v.is_finished() {
                        voice = None;
                    }
                }
                None => data.fill(0.0),
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the `f32` configuration whose rate range lies closest to
/// `target_rate`, preferring fewer channels on ties.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if (min..=max).contains(&target_rate) {
                0
            } else {
                min.abs_diff(target_rate).min(max.abs_diff(target_rate))
            };
            (distance, c.channels())
        })
}

/// One clip being played back at a fixed gain.
#[derive(Debug)]
pub struct Voice {
    clip: Arc<Clip>,
    gain: f32,
    // Fractional read position in clip samples.
    position: f64,
    step: f64,
}

impl Voice {
    /// Prepares `command` for playback on a device running at `output_rate`.
    ///
    /// # Arguments
    /// * `command` - Clip and gain to play
    /// * `output_rate` - Device sample rate in Hz; the clip is resampled to it
    pub fn new(command: PlayCommand, output_rate: u32) -> Self {
        let step = command.clip.sample_rate as f64 / output_rate as f64;
        Self {
            clip: command.clip,
            gain: command.gain,
            position: 0.0,
            step,
        }
    }

    /// Returns `true` once every sample of the clip has been rendered.
    pub fn is_finished(&self) -> bool {
        self.position >= self.clip.samples.len() as f64
    }

    /// Fills an interleaved buffer, writing the same sample to every channel.
    /// Frames past the end of the clip are silent.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let sample = self.next_sample() * self.gain;
            frame.fill(sample);
        }
    }

    fn next_sample(&mut self) -> f32 {
        let samples = &self.clip.samples;
        if self.is_finished() {
            return 0.0;
        }
        let index = self.position as usize;
        let frac = (self.position - index as f64) as f32;
        let current = samples[index];
        let next = samples.get(index + 1).copied().unwrap_or(0.0);
        self.position += self.step;
        current + (next - current) * frac
    }
}
