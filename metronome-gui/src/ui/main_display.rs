//! # Main Display Module
//!
//! Layout of the metronome window: Start/Stop button, BPM field, sound
//! picker and volume slider, stacked in a single column.

use iced::widget::{button, column, container, pick_list, row, text, text_input, vertical_slider, Space};
use iced::{Alignment, Element, Length};
use metronome_core::scheduler::MAX_VOLUME;
use metronome_core::{RunState, SoundId};

use crate::{AppDisplayData, Message};

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'_, Message> {
    let content = column![
        create_toggle_button(data.run_state),
        create_bpm_field(&data.bpm_text),
        pick_list(SoundId::ALL, Some(data.selected_sound), Message::SoundSelected),
        Space::with_height(10),
        create_volume_control(data.volume),
    ]
    .spacing(10)
    .align_x(Alignment::Center)
    .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

/// Label follows the state: "Start" while stopped, "Stop" while running.
fn create_toggle_button<'a>(state: RunState) -> Element<'a, Message> {
    let label = match state {
        RunState::Stopped => "Start",
        RunState::Running => "Stop",
    };
    button(text(label).size(18))
        .on_press(Message::Toggle)
        .padding([6, 24])
        .into()
}

/// Every edit is validated in `update` before it replaces `bpm_text`.
fn create_bpm_field(bpm_text: &str) -> Element<'_, Message> {
    column![
        text("BPM:"),
        text_input("60", bpm_text)
            .on_input(Message::BpmInput)
            .on_submit(Message::BpmSubmitted)
            .width(Length::Fixed(80.0)),
    ]
    .spacing(4)
    .align_x(Alignment::Center)
    .into()
}

fn create_volume_control<'a>(volume: u8) -> Element<'a, Message> {
    column![
        text("Volume"),
        row![
            vertical_slider(0..=MAX_VOLUME, volume, Message::VolumeChanged)
                .height(Length::Fixed(150.0)),
            text(volume.to_string()),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    ]
    .spacing(4)
    .align_x(Alignment::Center)
    .into()
}
