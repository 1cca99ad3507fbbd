//! # Dome Reverb Engine
//!
//! Two independent channel chains (left and right), each a classic
//! Schroeder/Freeverb-style network, with a fixed pre-EQ in front and tone
//! shaping behind:
//!
//! ```text
//!            ┌─────────────────────── × dry ─────────────────────────────┐
//!            │                                                           │
//! in L ──┬──►│ [Pre-EQ ×7] ► [Pre-delay] ► [8 combs ∥] ─┬─►(+)► [4 all-pass] ► [LP] ► [Shelf] ─┐
//!        │   │                                          │   ▲                                  │
//!        │   │                                       × 0.15 │                              [Width] ► × wet ►(+)► out
//!        │   │                                          ▼   │                                  │
//! in R ──┴──►│ [Pre-EQ ×7] ► [Pre-delay] ► [8 combs ∥] ─┴─►(+)► [4 all-pass] ► [LP] ► [Shelf] ─┘
//! ```
//!
//! Left and right use slightly different delay tables (the right side is
//! a little longer throughout) so the two tails are decorrelated, which
//! is what makes the result sound wide. The crossfeed then pulls them
//! back together just enough to avoid a hard-panned "ping-pong" image.
//!
//! ## Real-time safety
//!
//! All buffers are allocated in [`DomeReverb::prepare()`]. Changing the
//! knob or the preset only rewrites coefficients, so
//! [`DomeReverb::process()`] never allocates.

use nih_plug::nih_debug_assert;
use no_denormals::no_denormals;

use super::allpass::AllPassFilter;
use super::biquad::{Biquad, FilterShape};
use super::comb::CombFilter;
use super::delay_line::{ms_to_samples, DelayLine};
use super::mapping::{DomeMapping, Preset, PresetIndexError, COMB_FEEDBACK_CEILING};

const NUM_COMBS: usize = 8;
const NUM_ALLPASSES: usize = 4;
const NUM_EQ_BANDS: usize = 7;

/// Comb delay times in ms. Mutually prime-ish lengths keep the
/// resonances from lining up into a metallic tone.
const COMB_DELAYS_MS_LEFT: [f32; NUM_COMBS] = [29.7, 37.1, 41.1, 43.7, 47.3, 53.9, 59.3, 61.7];
const COMB_DELAYS_MS_RIGHT: [f32; NUM_COMBS] = [31.1, 39.7, 43.3, 47.1, 51.7, 57.3, 63.1, 67.9];
const COMB_MAX_DELAY_MS: f32 = 150.0;

const ALLPASS_DELAYS_MS_LEFT: [f32; NUM_ALLPASSES] = [5.0, 6.7, 10.0, 12.4];
const ALLPASS_DELAYS_MS_RIGHT: [f32; NUM_ALLPASSES] = [5.3, 7.1, 11.3, 13.7];
const ALLPASS_MAX_DELAY_MS: f32 = 30.0;
const ALLPASS_COEFFICIENT: f32 = 0.5;

const PRE_DELAY_MAX_MS: f32 = 50.0;

/// Fraction of each channel's comb output leaked into the other.
const CROSSFEED: f32 = 0.15;

const LOWPASS_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;
const BASS_SHELF_HZ: f64 = 200.0;
const BASS_SHELF_Q: f64 = 0.7;

/// Sample rate a freshly constructed engine is prepared for.
const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// One static band of the pre-EQ.
struct EqBand {
    shape: FilterShape,
    freq_hz: f64,
    q: f64,
}

/// The curve applied before the reverb: a gentle scoop of the low mids,
/// a presence lift around 4 kHz, and a lowpass to keep fizz out of the
/// tail. Applied top to bottom.
const PRE_EQ: [EqBand; NUM_EQ_BANDS] = [
    // +1 dB
    EqBand {
        shape: FilterShape::LowShelf { gain: 1.12 },
        freq_hz: 50.0,
        q: 0.7,
    },
    // -1 dB
    EqBand {
        shape: FilterShape::Peaking { gain: 0.89 },
        freq_hz: 100.0,
        q: 1.5,
    },
    // -3 dB
    EqBand {
        shape: FilterShape::Peaking { gain: 0.71 },
        freq_hz: 200.0,
        q: 1.0,
    },
    // -4 dB
    EqBand {
        shape: FilterShape::Peaking { gain: 0.63 },
        freq_hz: 400.0,
        q: 1.2,
    },
    // +2 dB
    EqBand {
        shape: FilterShape::Peaking { gain: 1.26 },
        freq_hz: 1000.0,
        q: 1.0,
    },
    // +6 dB
    EqBand {
        shape: FilterShape::Peaking { gain: 2.0 },
        freq_hz: 4000.0,
        q: 1.5,
    },
    EqBand {
        shape: FilterShape::LowPass,
        freq_hz: 10000.0,
        q: 0.5,
    },
];

/// Mid/side stereo width.
///
/// `width = 0` collapses to mono, `width = 1` returns the input.
#[inline]
pub fn apply_stereo_width(left: f32, right: f32, width: f32) -> (f32, f32) {
    let mid = (left + right) * 0.5;
    let side = (left - right) * 0.5 * width;
    (mid + side, mid - side)
}

/// Everything one side of the reverb owns.
#[derive(Debug, Clone)]
struct ChannelChain {
    pre_eq: [Biquad; NUM_EQ_BANDS],
    pre_delay: DelayLine,
    /// 0 bypasses the pre-delay line entirely.
    pre_delay_samples: usize,
    combs: [CombFilter; NUM_COMBS],
    allpasses: [AllPassFilter; NUM_ALLPASSES],
    lowpass: Biquad,
    bass_shelf: Biquad,
}

impl ChannelChain {
    fn new() -> Self {
        Self {
            pre_eq: Default::default(),
            pre_delay: DelayLine::new(),
            pre_delay_samples: 0,
            combs: Default::default(),
            allpasses: Default::default(),
            lowpass: Biquad::new(),
            bass_shelf: Biquad::new(),
        }
    }

    /// Allocate every buffer and load the static designs.
    fn prepare(
        &mut self,
        sample_rate: f64,
        comb_delays_ms: &[f32; NUM_COMBS],
        allpass_delays_ms: &[f32; NUM_ALLPASSES],
    ) {
        for (filter, band) in self.pre_eq.iter_mut().zip(PRE_EQ.iter()) {
            filter.set_coefficients(band.shape, sample_rate, band.freq_hz, band.q);
            filter.reset();
        }

        self.pre_delay.configure(sample_rate, PRE_DELAY_MAX_MS);

        for (comb, &delay_ms) in self.combs.iter_mut().zip(comb_delays_ms) {
            comb.prepare(sample_rate, COMB_MAX_DELAY_MS);
            comb.set_delay_ms(delay_ms);
        }

        for (allpass, &delay_ms) in self.allpasses.iter_mut().zip(allpass_delays_ms) {
            allpass.prepare(sample_rate, ALLPASS_MAX_DELAY_MS);
            allpass.set_delay_ms(delay_ms);
            allpass.set_coefficient(ALLPASS_COEFFICIENT);
        }

        self.lowpass.reset();
        self.bass_shelf.reset();
    }

    /// Push the knob/preset-derived coefficients into this chain.
    fn apply(
        &mut self,
        mapping: &DomeMapping,
        pre_delay_ms: f32,
        bass_boost: f32,
        sample_rate: f64,
    ) {
        self.pre_delay_samples =
            ms_to_samples(pre_delay_ms, sample_rate).min(self.pre_delay.capacity() - 1);
        if self.pre_delay_samples > 0 {
            self.pre_delay.set_delay_samples(self.pre_delay_samples);
        }

        for comb in &mut self.combs {
            comb.set_feedback(mapping.comb_feedback);
            comb.set_damping(mapping.comb_damping);
        }

        self.lowpass.set_coefficients(
            FilterShape::LowPass,
            sample_rate,
            f64::from(mapping.lowpass_cutoff_hz),
            LOWPASS_Q,
        );
        self.bass_shelf.set_coefficients(
            FilterShape::LowShelf { gain: bass_boost },
            sample_rate,
            BASS_SHELF_HZ,
            BASS_SHELF_Q,
        );
    }

    /// Pre-EQ → pre-delay → comb bank average.
    #[inline]
    fn excite(&mut self, input: f32) -> f32 {
        let eq = self
            .pre_eq
            .iter_mut()
            .fold(input, |sample, band| band.process_sample(sample));

        let delayed = if self.pre_delay_samples == 0 {
            eq
        } else {
            let out = self.pre_delay.read();
            self.pre_delay.write(eq);
            self.pre_delay.advance();
            out
        };

        let sum: f32 = self.combs.iter_mut().map(|comb| comb.process(delayed)).sum();
        sum * (1.0 / NUM_COMBS as f32)
    }

    /// All-pass cascade → lowpass → bass shelf.
    #[inline]
    fn diffuse(&mut self, input: f32) -> f32 {
        let diffused = self
            .allpasses
            .iter_mut()
            .fold(input, |sample, allpass| allpass.process(sample));
        let darkened = self.lowpass.process_sample(diffused);
        self.bass_shelf.process_sample(darkened)
    }

    fn clear(&mut self) {
        self.pre_eq.iter_mut().for_each(Biquad::reset);
        self.pre_delay.clear();
        self.combs.iter_mut().for_each(CombFilter::clear);
        self.allpasses.iter_mut().for_each(AllPassFilter::clear);
        self.lowpass.reset();
        self.bass_shelf.reset();
    }
}

/// The arena reverb: one knob, four presets, stereo in and out.
#[derive(Debug, Clone)]
pub struct DomeReverb {
    left: ChannelChain,
    right: ChannelChain,

    sample_rate: f64,
    dome_amount: f32,
    preset: Preset,
    stereo_width: f32,
    bass_boost: f32,
    mapping: DomeMapping,
}

impl DomeReverb {
    /// Create an engine prepared for 44.1 kHz with the default settings
    /// (dome 0.5, Arena width and bass).
    pub fn new() -> Self {
        let arena = Preset::Arena.settings();
        let mut reverb = Self {
            left: ChannelChain::new(),
            right: ChannelChain::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            dome_amount: 0.5,
            preset: Preset::Arena,
            stereo_width: arena.stereo_width,
            bass_boost: arena.bass_boost,
            mapping: DomeMapping::from_dome_amount(0.5),
        };
        reverb.prepare(DEFAULT_SAMPLE_RATE, 512);
        reverb
    }

    /// (Re)allocate every buffer for `sample_rate`, clear all filter
    /// memory, and re-derive coefficients from the current settings.
    ///
    /// Allocates: only call while audio processing is stopped.
    /// `_max_block_size` is accepted for hosts that pass it; processing
    /// is per-sample so it doesn't size anything.
    pub fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.left
            .prepare(sample_rate, &COMB_DELAYS_MS_LEFT, &ALLPASS_DELAYS_MS_LEFT);
        self.right
            .prepare(sample_rate, &COMB_DELAYS_MS_RIGHT, &ALLPASS_DELAYS_MS_RIGHT);
        self.update_parameters();
    }

    /// Set the knob position, clamped to `[0, 1]`. NaN is ignored and the
    /// previous position kept.
    pub fn set_dome_amount(&mut self, amount: f32) {
        if amount.is_nan() {
            return;
        }
        self.dome_amount = amount.clamp(0.0, 1.0);
        self.update_parameters();
    }

    /// Jump to a preset: dome amount, stereo width and bass boost all
    /// change at once. Filter memory is kept, so the tail carries on
    /// through the switch.
    pub fn set_preset(&mut self, preset: Preset) {
        let settings = preset.settings();
        self.preset = preset;
        self.dome_amount = settings.dome_amount;
        self.stereo_width = settings.stereo_width;
        self.bass_boost = settings.bass_boost;
        self.update_parameters();
    }

    /// Select a preset by its persisted index. Out-of-range indices are
    /// rejected and leave the engine unchanged.
    pub fn set_preset_index(&mut self, index: usize) -> Result<(), PresetIndexError> {
        let preset = Preset::try_from(index)?;
        self.set_preset(preset);
        Ok(())
    }

    /// Override the stereo width, clamped to `[0, 1]`. The next preset
    /// selection replaces it. NaN is ignored.
    pub fn set_stereo_width(&mut self, width: f32) {
        if width.is_nan() {
            return;
        }
        self.stereo_width = width.clamp(0.0, 1.0);
    }

    /// Zero every delay buffer and filter memory. Settings and buffer
    /// sizes are kept.
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    /// Process a channel-major buffer in place.
    ///
    /// One channel: the right path runs on a copy of the left input and
    /// only channel 0 is written. Two or more: the first two channels are
    /// processed as a stereo pair, the rest are left alone.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        let (left, mut right) = match channels {
            [] => return,
            [mono] => (mono, None),
            [left, right, ..] => (left, Some(right)),
        };
        let num_samples = match &right {
            Some(right) => left.len().min(right.len()),
            None => left.len(),
        };

        no_denormals(|| {
            for i in 0..num_samples {
                let input_left = left[i];
                let input_right = right.as_ref().map_or(input_left, |right| right[i]);

                let (out_left, out_right) = self.process_frame(input_left, input_right);

                left[i] = out_left;
                if let Some(right) = right.as_mut() {
                    right[i] = out_right;
                }
            }
        });
    }

    /// Run one stereo frame through the whole network.
    #[inline]
    fn process_frame(&mut self, input_left: f32, input_right: f32) -> (f32, f32) {
        let comb_left = self.left.excite(input_left);
        let comb_right = self.right.excite(input_right);

        let fed_left = comb_left + comb_right * CROSSFEED;
        let fed_right = comb_right + comb_left * CROSSFEED;

        let wet_left = self.left.diffuse(fed_left);
        let wet_right = self.right.diffuse(fed_right);

        let (wide_left, wide_right) = apply_stereo_width(wet_left, wet_right, self.stereo_width);

        let m = &self.mapping;
        (
            m.dry_gain * input_left + m.wet_gain * wide_left,
            m.dry_gain * input_right + m.wet_gain * wide_right,
        )
    }

    /// Re-derive every coefficient from `dome_amount` and `bass_boost`.
    fn update_parameters(&mut self) {
        self.mapping = DomeMapping::from_dome_amount(self.dome_amount);
        nih_debug_assert!(self.mapping.comb_feedback <= COMB_FEEDBACK_CEILING);

        let m = self.mapping;
        self.left
            .apply(&m, m.pre_delay_ms_left, self.bass_boost, self.sample_rate);
        self.right
            .apply(&m, m.pre_delay_ms_right, self.bass_boost, self.sample_rate);
    }

    /// How long the tail rings after the input stops, in samples.
    ///
    /// Each pass through the slowest comb scales the signal by at most
    /// the feedback gain, so reaching -60 dB takes
    /// `log(0.001) / log(feedback)` passes of the longest comb, plus the
    /// longest pre-delay before the first pass.
    pub fn tail_samples(&self) -> u32 {
        let feedback = self.mapping.comb_feedback.max(0.001);
        let repeats = -3.0 / feedback.log10();

        let longest_comb = self
            .left
            .combs
            .iter()
            .chain(self.right.combs.iter())
            .map(CombFilter::delay_samples)
            .max()
            .unwrap_or(0);
        let (pre_left, pre_right) = self.pre_delay_samples();

        (repeats * longest_comb as f32) as u32 + pre_left.max(pre_right) as u32
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn dome_amount(&self) -> f32 {
        self.dome_amount
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn stereo_width(&self) -> f32 {
        self.stereo_width
    }

    pub fn bass_boost(&self) -> f32 {
        self.bass_boost
    }

    pub fn wet_gain(&self) -> f32 {
        self.mapping.wet_gain
    }

    pub fn dry_gain(&self) -> f32 {
        self.mapping.dry_gain
    }

    pub fn lowpass_cutoff_hz(&self) -> f32 {
        self.mapping.lowpass_cutoff_hz
    }

    pub fn comb_feedback(&self) -> f32 {
        self.mapping.comb_feedback
    }

    pub fn comb_damping(&self) -> f32 {
        self.mapping.comb_damping
    }

    /// Current (left, right) pre-delay lengths in samples.
    pub fn pre_delay_samples(&self) -> (usize, usize) {
        (self.left.pre_delay_samples, self.right.pre_delay_samples)
    }
}

impl Default for DomeReverb {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
