//! # One-Knob Parameter Mapping
//!
//! The plugin has one knob, "Dome Amount", plus a preset selector. Every
//! internal coefficient of the reverb is derived from those two:
//!
//! | Derived quantity | Formula                    | Range          |
//! |------------------|----------------------------|----------------|
//! | wet gain         | `dome * 0.6`               | 0.0 – 0.6      |
//! | dry gain         | `1 - dome * 0.3`           | 1.0 – 0.7      |
//! | pre-delay left   | `dome * 25 ms`             | 0 – 25 ms      |
//! | pre-delay right  | `dome * 30 ms`             | 0 – 30 ms      |
//! | comb feedback    | `0.75 + dome * 0.12`       | 0.75 – 0.87    |
//! | comb damping     | `0.15 + dome * 0.35`       | 0.15 – 0.50    |
//! | lowpass cutoff   | `10000 - dome * 5000` Hz   | 10 kHz – 5 kHz |
//!
//! Turning the knob up makes the space bigger (longer tail, more
//! pre-delay, more reverb in the mix) and darker (more damping, lower
//! cutoff), which is how large venues sound.
//!
//! Presets don't add new curves. They jump the knob to a fixed position
//! and also set the stereo width and the bass shelf, which the knob
//! never touches.

use nih_plug::prelude::Enum;
use thiserror::Error;

/// Hard ceiling on comb feedback. The mapping tops out here at
/// `dome = 1.0`, keeping every comb loop well below unity gain.
pub const COMB_FEEDBACK_CEILING: f32 = 0.87;

/// A named venue configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Preset {
    #[name = "Arena"]
    Arena,
    #[name = "Stadium"]
    Stadium,
    #[name = "Hall"]
    Hall,
    #[name = "Club"]
    Club,
}

/// What selecting a preset overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSettings {
    pub dome_amount: f32,
    pub stereo_width: f32,
    /// Linear gain of the 200 Hz low shelf.
    pub bass_boost: f32,
}

/// A persisted preset index that doesn't name a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("preset index {0} is out of range (expected 0..={max})", max = Preset::ALL.len() - 1)]
pub struct PresetIndexError(pub usize);

impl Preset {
    /// All presets, in selector order.
    pub const ALL: [Preset; 4] = [Preset::Arena, Preset::Stadium, Preset::Hall, Preset::Club];

    pub fn settings(self) -> PresetSettings {
        let (dome_amount, stereo_width, bass_boost) = match self {
            // Big indoor dome: long tail, slightly narrowed image.
            Preset::Arena => (0.60, 0.80, 1.5),
            // Open air: the biggest space, full width.
            Preset::Stadium => (0.80, 1.00, 1.8),
            Preset::Hall => (0.40, 0.60, 1.2),
            // Small live house: short room, narrow, lots of low end.
            Preset::Club => (0.25, 0.50, 2.0),
        };
        PresetSettings {
            dome_amount,
            stereo_width,
            bass_boost,
        }
    }

    /// Position in [`Preset::ALL`], which is also the persisted index.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Preset {
    type Error = PresetIndexError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Preset::ALL.get(index).copied().ok_or(PresetIndexError(index))
    }
}

/// Every knob-driven coefficient, computed in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomeMapping {
    pub wet_gain: f32,
    pub dry_gain: f32,
    pub pre_delay_ms_left: f32,
    pub pre_delay_ms_right: f32,
    pub comb_feedback: f32,
    pub comb_damping: f32,
    pub lowpass_cutoff_hz: f32,
}

impl DomeMapping {
    /// Map a knob position onto the reverb's coefficients. The amount is
    /// clamped into `[0, 1]` first; NaN maps to a fully dry setting.
    pub fn from_dome_amount(dome_amount: f32) -> Self {
        let dome = if dome_amount.is_nan() {
            0.0
        } else {
            dome_amount.clamp(0.0, 1.0)
        };
        Self {
            wet_gain: dome * 0.6,
            dry_gain: 1.0 - dome * 0.3,
            // The right side waits a little longer than the left to
            // widen the image.
            pre_delay_ms_left: dome * 25.0,
            pre_delay_ms_right: dome * 30.0,
            comb_feedback: (0.75 + dome * 0.12).min(COMB_FEEDBACK_CEILING),
            comb_damping: 0.15 + dome * 0.35,
            lowpass_cutoff_hz: 10000.0 - dome * 5000.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Sweep the knob and verify every derived quantity stays in range.
    #[test]
    fn test_derived_coefficients_stay_in_bounds() {
        for step in 0..=100 {
            let dome = step as f32 / 100.0;
            let m = DomeMapping::from_dome_amount(dome);

            assert!(
                (0.75..=COMB_FEEDBACK_CEILING).contains(&m.comb_feedback),
                "dome {dome}: feedback {} out of range",
                m.comb_feedback
            );
            assert!(
                (0.15..=0.50).contains(&m.comb_damping),
                "dome {dome}: damping {} out of range",
                m.comb_damping
            );
            assert!((0.0..=0.6).contains(&m.wet_gain));
            assert!((0.7..=1.0).contains(&m.dry_gain));
            assert!((5000.0..=10000.0).contains(&m.lowpass_cutoff_hz));
        }
    }

    #[test]
    fn test_endpoints() {
        let dry = DomeMapping::from_dome_amount(0.0);
        assert_eq!(dry.wet_gain, 0.0);
        assert_eq!(dry.dry_gain, 1.0);
        assert_eq!(dry.pre_delay_ms_left, 0.0);
        assert_eq!(dry.comb_feedback, 0.75);
        assert_eq!(dry.lowpass_cutoff_hz, 10000.0);

        let full = DomeMapping::from_dome_amount(1.0);
        assert!((full.wet_gain - 0.6).abs() < 1e-6);
        assert!((full.dry_gain - 0.7).abs() < 1e-6);
        assert!((full.pre_delay_ms_left - 25.0).abs() < 1e-6);
        assert!((full.pre_delay_ms_right - 30.0).abs() < 1e-6);
        assert!((full.comb_feedback - 0.87).abs() < 1e-6);
        assert!((full.comb_damping - 0.5).abs() < 1e-6);
        assert_eq!(full.lowpass_cutoff_hz, 5000.0);
    }

    #[test]
    fn test_out_of_range_amount_is_clamped() {
        assert_eq!(DomeMapping::from_dome_amount(-3.0), DomeMapping::from_dome_amount(0.0));
        assert_eq!(DomeMapping::from_dome_amount(7.5), DomeMapping::from_dome_amount(1.0));
        assert_eq!(
            DomeMapping::from_dome_amount(f32::NAN),
            DomeMapping::from_dome_amount(0.0)
        );
    }

    #[test]
    fn test_preset_table() {
        let stadium = Preset::Stadium.settings();
        assert_eq!(stadium.dome_amount, 0.80);
        assert_eq!(stadium.stereo_width, 1.00);
        assert_eq!(stadium.bass_boost, 1.8);

        let club = Preset::Club.settings();
        assert_eq!(club.dome_amount, 0.25);
        assert_eq!(club.bass_boost, 2.0);
    }

    #[test]
    fn test_preset_index_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::try_from(preset.index()), Ok(preset));
        }
        assert_eq!(Preset::Hall.index(), 2);
        assert_eq!(Preset::variants()[Preset::Club.index()], "Club");
    }

    #[test]
    fn test_bad_preset_index_is_an_error() {
        let err = Preset::try_from(4).unwrap_err();
        assert_eq!(err, PresetIndexError(4));
        assert_eq!(err.to_string(), "preset index 4 is out of range (expected 0..=3)");
    }
}
