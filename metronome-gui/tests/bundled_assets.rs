//! The GUI refuses to start without its click sounds; make sure the
//! shipped ones decode.

use std::path::Path;

use metronome_core::{SoundBank, SoundId};

const GUI_ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

#[test]
fn bundled_sounds_load() {
    let bank = SoundBank::load(Path::new(GUI_ASSETS)).expect("bundled assets should decode");

    for id in SoundId::ALL {
        let clip = bank.clip(id);
        assert_eq!(clip.sample_rate, 44100);
        assert!(!clip.samples.is_empty(), "{id} is empty");
        assert!(clip.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(clip.duration_secs() < 0.25, "{id} rings longer than the fastest beat");
    }
}
