//! # UI Module
//!
//! This module contains the UI components for the metronome window.

pub mod main_display;
