//! # Metronome - Desktop GUI
//!
//! This module contains the main GUI application for the metronome.
//! It owns the tempo scheduler and wires its two capabilities to the
//! outside world.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application; all scheduler state lives here
//! - **Beat Timer**: each armed beat is a deferred task on the same event loop
//! - **Audio Thread**: dedicated thread owning the output stream
//! - **Communication**: Crossbeam channel carrying play commands to the audio thread

mod audio_worker;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use iced::keyboard::{self, key};
use iced::{event, window, Element, Event, Subscription, Task, Theme};
use metronome_core::{
    tempo, MetronomeConfig, RunState, SoundBank, SoundId, TempoScheduler, Tick, Timer,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use audio_worker::{AudioWorker, ChannelPlayback};
use ui::main_display::create_main_view;

/// Directory holding the bundled click sounds.
const ASSET_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

const WINDOW_SIZE: (f32, f32) = (240.0, 380.0);

/// Main entry point for the metronome.
///
/// Loads the click sounds first: a missing or broken asset aborts startup
/// before any window opens.
pub fn main() -> anyhow::Result<()> {
    setup_logging();
    info!("Starting Metronome...");

    let config = MetronomeConfig {
        asset_dir: PathBuf::from(ASSET_DIR),
        ..MetronomeConfig::default()
    };
    let sounds = SoundBank::load(&config.asset_dir)
        .with_context(|| format!("loading click sounds from {}", config.asset_dir.display()))?;

    iced::application("Metronome App", MetronomeApp::update, MetronomeApp::view)
        .subscription(MetronomeApp::subscription)
        .theme(MetronomeApp::theme)
        .window_size(WINDOW_SIZE)
        .run_with(move || (MetronomeApp::new(config, sounds), Task::none()))?;

    info!("Metronome closed");
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Application message types.
#[derive(Debug, Clone)]
pub enum Message {
    /// Start/Stop button or spacebar
    Toggle,
    /// Candidate new content of the BPM field
    BpmInput(String),
    /// Enter pressed in the BPM field
    BpmSubmitted,
    SoundSelected(SoundId),
    VolumeChanged(u8),
    /// An armed beat timer expired
    Beat(Tick),
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub run_state: RunState,
    /// Current BPM field content, always empty or a valid tempo
    pub bpm_text: String,
    pub selected_sound: SoundId,
    pub volume: u8,
}

/// Main application state.
struct MetronomeApp {
    scheduler: TempoScheduler,
    playback: ChannelPlayback,
    // Kept alive for the lifetime of the window; shuts audio down on drop.
    _audio_worker: Option<AudioWorker>,
    display_data: AppDisplayData,
}

/// Timer capability backed by the Iced runtime.
///
/// Collects the beats armed during one update and hands them back as
/// delayed tasks, so they are delivered as messages on the same loop.
#[derive(Default)]
struct TaskTimer {
    tasks: Vec<Task<Message>>,
}

impl Timer for TaskTimer {
    fn after(&mut self, delay: Duration, tick: Tick) {
        // The sleep is created on first poll, inside the runtime.
        let wait = async move { tokio::time::sleep(delay).await };
        self.tasks.push(Task::perform(wait, move |()| Message::Beat(tick)));
    }
}

impl TaskTimer {
    fn into_task(self) -> Task<Message> {
        Task::batch(self.tasks)
    }
}

impl MetronomeApp {
    fn new(config: MetronomeConfig, sounds: SoundBank) -> Self {
        let (audio_worker, playback) = AudioWorker::spawn(sounds, config.target_sample_rate);
        Self::with_playback(&config, playback, Some(audio_worker))
    }

    /// Builds the app around an existing playback handle. Without a worker
    /// nothing drains the channel and no device is opened.
    fn with_playback(
        config: &MetronomeConfig,
        playback: ChannelPlayback,
        audio_worker: Option<AudioWorker>,
    ) -> Self {
        let scheduler = TempoScheduler::new(config);

        let display_data = AppDisplayData {
            run_state: scheduler.state(),
            bpm_text: scheduler.bpm().to_string(),
            selected_sound: scheduler.selected_sound(),
            volume: scheduler.volume(),
        };

        Self {
            scheduler,
            playback,
            _audio_worker: audio_worker,
            display_data,
        }
    }

    /// Handles application state updates based on incoming messages.
    ///
    /// Button and hotkey both arrive as `Message::Toggle`, so they go through
    /// exactly the same transition. Edits to the BPM field only change the
    /// text; the tempo is read from it on start, or on Enter while running.
    fn update(&mut self, message: Message) -> Task<Message> {
        debug!("Received message: {:?}", message);
        let mut timer = TaskTimer::default();

        match message {
            Message::Toggle => {
                let requested = tempo::parse_bpm_field(&self.display_data.bpm_text);
                self.scheduler.toggle(requested, &mut self.playback, &mut timer);
            }
            Message::BpmInput(candidate) => {
                if tempo::validate_bpm_input(&candidate) {
                    self.display_data.bpm_text = candidate;
                } else {
                    debug!("Rejected BPM input {:?}", candidate);
                }
            }
            Message::BpmSubmitted => {
                if self.scheduler.is_running() {
                    if let Some(bpm) = tempo::parse_bpm_field(&self.display_data.bpm_text) {
                        self.scheduler.set_bpm(bpm);
                    }
                }
            }
            Message::SoundSelected(sound) => {
                self.scheduler.set_selected_sound(sound);
            }
            Message::VolumeChanged(volume) => {
                self.scheduler.set_volume(volume);
            }
            Message::Beat(tick) => {
                self.scheduler.play_trigger(tick, &mut self.playback, &mut timer);
            }
        }

        self.display_data.run_state = self.scheduler.state();
        self.display_data.selected_sound = self.scheduler.selected_sound();
        self.display_data.volume = self.scheduler.volume();

        timer.into_task()
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Routes the spacebar to the same toggle as the Start/Stop button,
    /// including presses a focused widget has already handled.
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(hotkey_event)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn hotkey_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => hotkey(key, modifiers),
        _ => None,
    }
}

fn hotkey(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Named(key::Named::Space) => Some(Message::Toggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Receiver;
    use metronome_core::audio::PlayCommand;
    use metronome_core::Bpm;
    use std::path::Path;

    /// App wired to a bare channel instead of the audio thread.
    fn test_app() -> (MetronomeApp, Receiver<PlayCommand>) {
        let sounds = SoundBank::load(Path::new(ASSET_DIR)).unwrap();
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let playback = ChannelPlayback::new(sounds, command_tx);
        let app = MetronomeApp::with_playback(&MetronomeConfig::default(), playback, None);
        (app, command_rx)
    }

    #[test]
    fn test_rejected_edits_keep_field() {
        let (mut app, _rx) = test_app();

        for candidate in ["abc", "300", "0", "60 "] {
            let _ = app.update(Message::BpmInput(candidate.to_string()));
            assert_eq!(app.display_data.bpm_text, "60", "accepted {candidate:?}");
        }
    }

    #[test]
    fn test_accepted_edit_is_read_on_start() {
        let (mut app, rx) = test_app();

        let _ = app.update(Message::BpmInput("120".to_string()));
        assert_eq!(app.display_data.bpm_text, "120");
        assert_eq!(app.scheduler.bpm().get(), 60);

        let _ = app.update(Message::Toggle);
        assert_eq!(app.display_data.run_state, RunState::Running);
        assert_eq!(app.scheduler.bpm().get(), 120);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_empty_field_at_start_keeps_tempo() {
        let (mut app, rx) = test_app();
        app.scheduler.set_bpm(Bpm::new(90).unwrap());

        let _ = app.update(Message::BpmInput(String::new()));
        assert_eq!(app.display_data.bpm_text, "");
        let _ = app.update(Message::Toggle);

        assert!(app.scheduler.is_running());
        assert_eq!(app.scheduler.bpm().get(), 90);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_partial_edits_do_not_change_running_tempo() {
        let (mut app, _rx) = test_app();
        let _ = app.update(Message::BpmInput("240".to_string()));
        let _ = app.update(Message::Toggle);

        // Retyping 120 over 240 passes through "1" and "12".
        for candidate in ["", "1", "12", "120"] {
            let _ = app.update(Message::BpmInput(candidate.to_string()));
            assert_eq!(app.scheduler.bpm().get(), 240);
            assert_eq!(app.scheduler.interval(), Duration::from_millis(250));
        }

        let _ = app.update(Message::BpmSubmitted);
        assert_eq!(app.scheduler.bpm().get(), 120);
    }

    #[test]
    fn test_submit_while_stopped_waits_for_start() {
        let (mut app, _rx) = test_app();

        let _ = app.update(Message::BpmInput("200".to_string()));
        let _ = app.update(Message::BpmSubmitted);

        assert_eq!(app.scheduler.bpm().get(), 60);
        assert!(!app.scheduler.is_running());
    }

    #[test]
    fn test_button_and_spacebar_match() {
        let space = keyboard::Key::Named(key::Named::Space);
        let from_key = hotkey(space, keyboard::Modifiers::default()).unwrap();

        for message in [Message::Toggle, from_key] {
            let (mut app, rx) = test_app();

            let _ = app.update(message.clone());
            assert_eq!(app.display_data.run_state, RunState::Running);
            let _ = app.update(message.clone());
            assert_eq!(app.display_data.run_state, RunState::Stopped);
            let _ = app.update(message);
            assert_eq!(app.display_data.run_state, RunState::Running);

            // One immediate beat per start, nothing from the stop.
            assert_eq!(rx.try_iter().count(), 2);
        }
    }

    #[test]
    fn test_settings_reach_the_playback_channel() {
        let (mut app, rx) = test_app();

        let _ = app.update(Message::VolumeChanged(100));
        let _ = app.update(Message::SoundSelected(SoundId::Tick));
        let _ = app.update(Message::Toggle);

        let command = rx.try_recv().unwrap();
        assert_eq!(command.gain, 1.0);
        assert_eq!(app.display_data.selected_sound, SoundId::Tick);
        assert_eq!(app.display_data.volume, 100);
    }

    #[test]
    fn test_space_toggles() {
        let space = keyboard::Key::Named(key::Named::Space);
        assert!(matches!(hotkey(space, keyboard::Modifiers::default()), Some(Message::Toggle)));
    }

    #[test]
    fn test_other_keys_ignored() {
        let enter = keyboard::Key::Named(key::Named::Enter);
        let letter = keyboard::Key::Character("s".into());
        assert!(hotkey(enter, keyboard::Modifiers::default()).is_none());
        assert!(hotkey(letter, keyboard::Modifiers::default()).is_none());
    }

    #[test]
    fn test_timer_collects_one_task_per_beat() {
        let mut scheduler = TempoScheduler::default();
        let mut timer = TaskTimer::default();
        let mut plays = 0;

        struct Count<'a>(&'a mut usize);
        impl metronome_core::Playback for Count<'_> {
            fn play(&mut self, _sound: SoundId, _gain: f32) {
                *self.0 += 1;
            }
        }

        scheduler.start(None, &mut Count(&mut plays), &mut timer);

        assert_eq!(plays, 1);
        assert_eq!(timer.tasks.len(), 1);
    }
}
