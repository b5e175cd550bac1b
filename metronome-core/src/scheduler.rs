//! # Tempo Scheduler
//!
//! Decides when each click fires. The scheduler owns the run state, tempo,
//! volume and selected sound, and drives playback through two capabilities
//! supplied by the host:
//!
//! - [`Playback`]: play a sound at a gain, fire-and-forget
//! - [`Timer`]: hand a [`Tick`] back after a delay, on the same event loop
//!
//! Every beat is a single-shot timer that re-arms itself when it fires, so
//! the chain is driven entirely by [`TempoScheduler::play_trigger`]. Stopping
//! never cancels the pending timer. Instead each tick checks the state when
//! it fires: a tick that arrives after `stop`, or one left over from an
//! earlier start, does nothing and the chain ends there.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::MetronomeConfig;
use crate::sound::SoundId;
use crate::tempo::{self, Bpm};

/// Highest accepted volume.
pub const MAX_VOLUME: u8 = 100;

/// Plays a sound. Implementations must not block the caller.
pub trait Playback {
    fn play(&mut self, sound: SoundId, gain: f32);
}

/// Defers a tick. The host must pass `tick` to
/// [`TempoScheduler::play_trigger`] once `delay` has elapsed.
pub trait Timer {
    fn after(&mut self, delay: Duration, tick: Tick);
}

/// Token carried by an armed timer, identifying the chain that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    chain: u64,
}

/// Whether the metronome is clicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Run state and settings of one metronome.
#[derive(Debug, Clone)]
pub struct TempoScheduler {
    state: RunState,
    bpm: Bpm,
    interval_ms: f64,   // Recomputed on every set_bpm
    volume: u8,         // 0 - 100, read on every beat
    selected_sound: SoundId,
    // Bumped on every start; ticks from older chains are ignored.
    chain: u64,
}

impl Default for TempoScheduler {
    fn default() -> Self {
        Self::new(&MetronomeConfig::default())
    }
}

impl TempoScheduler {
    /// Creates a stopped scheduler from the startup defaults.
    ///
    /// # Arguments
    /// * `config` - Initial tempo, volume and sound
    pub fn new(config: &MetronomeConfig) -> Self {
        assert!(
            config.default_volume <= MAX_VOLUME,
            "default volume {} exceeds {}",
            config.default_volume,
            MAX_VOLUME
        );
        Self {
            state: RunState::Stopped,
            bpm: config.default_bpm,
            interval_ms: config.default_bpm.interval_ms(),
            volume: config.default_volume,
            selected_sound: config.default_sound,
            chain: 0,
        }
    }

    /// Starts clicking.
    ///
    /// `requested_bpm` is the tempo currently in the input field; `None`
    /// keeps the current tempo. The first beat plays immediately and the
    /// next one is armed one interval later. Does nothing if already running.
    pub fn start(
        &mut self,
        requested_bpm: Option<Bpm>,
        playback: &mut impl Playback,
        timer: &mut impl Timer,
    ) {
        if self.is_running() {
            debug!("start ignored: already running");
            return;
        }

        self.state = RunState::Running;
        self.chain = self.chain.wrapping_add(1);
        if let Some(bpm) = requested_bpm {
            self.set_bpm(bpm);
        }
        info!("Metronome started at {} BPM ({:.1} ms)", self.bpm, self.interval_ms);

        self.beat(playback, timer);
    }

    /// Stops clicking. A timer that is already armed still fires once and
    /// is ignored.
    pub fn stop(&mut self) {
        if self.is_running() {
            info!("Metronome stopped");
        }
        self.state = RunState::Stopped;
    }

    /// Stops if running, starts otherwise. Returns the new state.
    pub fn toggle(
        &mut self,
        requested_bpm: Option<Bpm>,
        playback: &mut impl Playback,
        timer: &mut impl Timer,
    ) -> RunState {
        match self.state {
            RunState::Running => self.stop(),
            RunState::Stopped => self.start(requested_bpm, playback, timer),
        }
        self.state
    }

    /// Changes the tempo. A wait already in progress keeps its old length;
    /// the new interval applies from the next beat.
    pub fn set_bpm(&mut self, bpm: Bpm) {
        self.bpm = bpm;
        self.interval_ms = bpm.interval_ms();
        debug!("BPM set to {} ({:.1} ms)", bpm, self.interval_ms);
    }

    /// Changes the volume (0 - 100), heard from the next beat.
    pub fn set_volume(&mut self, volume: u8) {
        assert!(volume <= MAX_VOLUME, "volume {} exceeds {}", volume, MAX_VOLUME);
        self.volume = volume;
    }

    /// Changes the sound, heard from the next beat.
    pub fn set_selected_sound(&mut self, sound: SoundId) {
        self.selected_sound = sound;
    }

    /// Handles a fired timer.
    ///
    /// Plays and re-arms only if the metronome is running and `tick` belongs
    /// to the current chain. Returns whether a beat was played.
    pub fn play_trigger(
        &mut self,
        tick: Tick,
        playback: &mut impl Playback,
        timer: &mut impl Timer,
    ) -> bool {
        if !self.is_running() || tick.chain != self.chain {
            debug!("Stale tick from chain {} dropped", tick.chain);
            return false;
        }
        self.beat(playback, timer);
        true
    }

    fn beat(&mut self, playback: &mut impl Playback, timer: &mut impl Timer) {
        debug!("Beat: {} at gain {:.2}", self.selected_sound, self.gain());
        playback.play(self.selected_sound, self.gain());
        timer.after(self.interval(), Tick { chain: self.chain });
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// `true` between a `start` and the matching `stop`.
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Tempo the next armed beat will use.
    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    /// Wait between beats in milliseconds (`60000 / bpm`, unrounded).
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Same wait as [`interval_ms`](Self::interval_ms), as handed to the timer.
    pub fn interval(&self) -> Duration {
        tempo::interval_duration(self.interval_ms)
    }

    /// Volume (0 - 100).
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Volume as a playback gain in `[0.0, 1.0]`.
    pub fn gain(&self) -> f32 {
        self.volume as f32 / MAX_VOLUME as f32
    }

    /// Sound played on the next beat.
    pub fn selected_sound(&self) -> SoundId {
        self.selected_sound
    }
}
