//! # Tempo Module
//!
//! BPM bounds, the validated [`Bpm`] value type and the arithmetic that
//! turns a tempo into the wait between two beats.
//!
//! The BPM text field in the GUI runs every candidate edit through
//! [`validate_bpm_input`] before accepting it, so out-of-range tempos never
//! reach the scheduler.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MetronomeError;

/// Slowest accepted tempo.
pub const MIN_BPM: u32 = 1;

/// Fastest accepted tempo.
pub const MAX_BPM: u32 = 240;

/// Milliseconds in one minute.
const MS_PER_MINUTE: f64 = 60_000.0;

/// Tempo used until the user enters another one.
pub const DEFAULT_BPM: Bpm = Bpm(60);

/// A tempo in beats per minute, always within `MIN_BPM..=MAX_BPM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bpm(u32);

impl Bpm {
    /// Returns `None` when `value` is outside `MIN_BPM..=MAX_BPM`.
    pub fn new(value: u32) -> Option<Self> {
        (MIN_BPM..=MAX_BPM).contains(&value).then_some(Self(value))
    }

    /// Tempo as a plain integer.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Milliseconds between two beats at this tempo.
    pub fn interval_ms(self) -> f64 {
        interval_ms(self.0)
    }
}

impl Default for Bpm {
    fn default() -> Self {
        DEFAULT_BPM
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Bpm {
    type Err = MetronomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .ok()
            .and_then(Bpm::new)
            .ok_or_else(|| MetronomeError::InvalidBpm {
                input: s.to_string(),
                min: MIN_BPM,
                max: MAX_BPM,
            })
    }
}

/// Calculates the wait between two beats.
///
/// # Arguments
/// * `bpm` - Tempo in beats per minute (must be non-zero)
///
/// # Returns
/// * `60000 / bpm` in milliseconds, without rounding
pub fn interval_ms(bpm: u32) -> f64 {
    MS_PER_MINUTE / bpm as f64
}

/// Converts a millisecond interval into a `Duration` for the timer.
pub fn interval_duration(interval_ms: f64) -> Duration {
    Duration::from_secs_f64(interval_ms / 1000.0)
}

/// Decides whether the BPM field may take `candidate` as its new content.
///
/// The empty string is accepted so the user can clear the field before
/// typing a new tempo. Anything else must parse as an integer in
/// `MIN_BPM..=MAX_BPM`.
pub fn validate_bpm_input(candidate: &str) -> bool {
    candidate.is_empty() || candidate.parse::<Bpm>().is_ok()
}

/// Reads the BPM field. An empty field means "no value yet".
pub fn parse_bpm_field(text: &str) -> Option<Bpm> {
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_default_interval_is_one_second() {
        assert_eq!(DEFAULT_BPM.get(), 60);
        assert_eq!(DEFAULT_BPM.interval_ms(), 1000.0);
        assert_eq!(interval_duration(DEFAULT_BPM.interval_ms()), Duration::from_secs(1));
    }

    #[test]
    fn test_interval_edges() {
        assert_eq!(interval_ms(1), 60_000.0);
        assert_eq!(interval_ms(240), 250.0);
        assert_eq!(interval_ms(120), 500.0);
    }

    #[test]
    fn test_bpm_bounds() {
        assert!(Bpm::new(0).is_none());
        assert_eq!(Bpm::new(1).map(Bpm::get), Some(1));
        assert_eq!(Bpm::new(240).map(Bpm::get), Some(240));
        assert!(Bpm::new(241).is_none());
    }

    #[test]
    fn test_validator_accepts_empty_and_in_range() {
        assert!(validate_bpm_input(""));
        assert!(validate_bpm_input("1"));
        assert!(validate_bpm_input("60"));
        assert!(validate_bpm_input("240"));
    }

    #[test]
    fn test_validator_rejects_garbage() {
        for input in ["0", "241", "1000", "-5", "abc", "6a", "12.5", " ", " 60", "60 "] {
            assert!(!validate_bpm_input(input), "accepted {input:?}");
        }
    }

    #[test]
    fn test_parse_error_reports_input() {
        let err = "300".parse::<Bpm>().unwrap_err();
        assert!(matches!(err, MetronomeError::InvalidBpm { ref input, .. } if input == "300"));
        assert_eq!(parse_bpm_field(""), None);
        assert_eq!(parse_bpm_field("90"), Bpm::new(90));
    }

    #[quickcheck]
    fn prop_interval_is_exact(bpm: u32) -> TestResult {
        match Bpm::new(bpm) {
            Some(bpm) => TestResult::from_bool(bpm.interval_ms() == 60_000.0 / bpm.get() as f64),
            None => TestResult::discard(),
        }
    }

    #[test]
    fn prop_validator_matches_range() {
        fn property(value: i64) -> bool {
            let accepted = validate_bpm_input(&value.to_string());
            accepted == (MIN_BPM as i64..=MAX_BPM as i64).contains(&value)
        }

        let mut qc = quickcheck::QuickCheck::new().tests(200);
        qc.quickcheck(property as fn(i64) -> bool);
    }

    #[test]
    fn test_every_valid_bpm_has_exact_interval() {
        for value in MIN_BPM..=MAX_BPM {
            let bpm = Bpm::new(value).unwrap();
            assert_eq!(bpm.interval_ms(), 60_000.0 / value as f64);
            assert!(validate_bpm_input(&value.to_string()));
        }
    }
}
