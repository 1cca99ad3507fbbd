//! # Biquad Filter
//!
//! A biquad is a second-order IIR filter: two poles and two zeros. With
//! the right five coefficients it becomes a lowpass, a shelf, a peaking
//! bell, and so on. The reverb uses it for the fixed pre-EQ curve and for
//! the tone shaping after the diffusion network.
//!
//! The reverb treats a biquad as an opaque stateful unary function:
//! design it once with [`Biquad::set_coefficients`], then feed it one
//! sample at a time. Nothing outside this module knows about the
//! coefficient math.
//!
//! ## Coefficient design
//!
//! Coefficients follow the RBJ "Audio EQ Cookbook" with the gain given as
//! a *linear* amplitude factor (1.0 = unity, 2.0 ≈ +6 dB). The cookbook's
//! `A` is the square root of that factor:
//!
//! ```text
//! A     = sqrt(gain)
//! w0    = 2π * f0 / fs
//! alpha = sin(w0) / (2 * Q)
//! ```
//!
//! ## Processing
//!
//! Samples run through transposed direct form II, which needs only two
//! state variables and behaves well with single-precision floats:
//!
//! ```text
//! y  = b0*x + s1
//! s1 = b1*x - a1*y + s2
//! s2 = b2*x - a2*y
//! ```

use std::f64::consts::PI;

/// The filter responses the reverb needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterShape {
    /// 12 dB/octave lowpass.
    LowPass,
    /// Shelf that scales everything below the corner by `gain`.
    LowShelf { gain: f32 },
    /// Bell centred on the design frequency that scales it by `gain`.
    Peaking { gain: f32 },
}

/// Normalized biquad coefficients (`a0` divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl BiquadCoefficients {
    /// A filter that passes its input through unchanged.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design coefficients for `shape` at `freq_hz` with quality `q`.
    ///
    /// The frequency is clamped into `[2 Hz, 0.49 * sample_rate]`: at or
    /// above Nyquist the bilinear transform stops producing a stable
    /// filter.
    pub fn design(shape: FilterShape, sample_rate: f64, freq_hz: f64, q: f64) -> Self {
        let freq = freq_hz.clamp(2.0, sample_rate * 0.49);
        let q = q.max(0.01);
        let w0 = 2.0 * PI * freq / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match shape {
            FilterShape::LowPass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterShape::LowShelf { gain } => {
                let a = f64::from(gain.max(0.0)).sqrt();
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
            FilterShape::Peaking { gain } => {
                // A zero gain would divide by zero below; floor it at -120 dB.
                let a = f64::from(gain.max(1e-6)).sqrt();
                (
                    1.0 + alpha * a,
                    -2.0 * cos_w0,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_w0,
                    1.0 - alpha / a,
                )
            }
        };

        Self {
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
        }
    }
}

impl BiquadCoefficients {
    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A stateful biquad filter.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coefficients: BiquadCoefficients,
    s1: f32,
    s2: f32,
}

impl Biquad {
    /// Create a passthrough filter with cleared state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Redesign the filter. State is kept, so this can be called while
    /// audio is running. A design that comes out non-finite (a NaN
    /// frequency, Q or gain) is dropped and the previous response kept.
    pub fn set_coefficients(&mut self, shape: FilterShape, sample_rate: f64, freq_hz: f64, q: f64) {
        let coefficients = BiquadCoefficients::design(shape, sample_rate, freq_hz, q);
        if coefficients.is_finite() {
            self.coefficients = coefficients;
        }
    }

    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + self.s1;
        self.s1 = c.b1 * input - c.a1 * output + self.s2;
        self.s2 = c.b2 * input - c.a2 * output;
        output
    }

    /// Clear the filter memory. Coefficients are untouched.
    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44100.0;

    /// Steady-state RMS gain of a filter for a sine at `freq`.
    fn sine_gain(filter: &mut Biquad, freq: f64) -> f32 {
        let n = 44100;
        let skip = 4410;
        let mut in_sq = 0.0_f64;
        let mut out_sq = 0.0_f64;
        for i in 0..n {
            let x = (2.0 * PI * freq * i as f64 / SR).sin() as f32;
            let y = filter.process_sample(x);
            if i >= skip {
                in_sq += f64::from(x * x);
                out_sq += f64::from(y * y);
            }
        }
        (out_sq / in_sq).sqrt() as f32
    }

    #[test]
    fn test_default_is_passthrough() {
        let mut filter = Biquad::new();
        for input in [0.25, -1.0, 0.8] {
            assert!((filter.process_sample(input) - input).abs() < 1e-6);
        }
    }

    #[test]
    fn test_lowpass_passes_lows_and_cuts_highs() {
        let mut filter = Biquad::new();
        filter.set_coefficients(FilterShape::LowPass, SR, 1000.0, std::f64::consts::FRAC_1_SQRT_2);
        let low = sine_gain(&mut filter, 100.0);

        filter.reset();
        let high = sine_gain(&mut filter, 10000.0);

        assert!((low - 1.0).abs() < 0.02, "100 Hz should pass, gain {low}");
        assert!(high < 0.03, "10 kHz should be cut by ~40 dB, gain {high}");
    }

    /// A peaking bell hits its linear gain exactly at the centre.
    #[test]
    fn test_peaking_gain_at_center() {
        let mut filter = Biquad::new();
        filter.set_coefficients(FilterShape::Peaking { gain: 2.0 }, SR, 4000.0, 1.5);
        let gain = sine_gain(&mut filter, 4000.0);
        assert!((gain - 2.0).abs() < 0.05, "Expected gain 2.0 at 4 kHz, got {gain}");

        filter.reset();
        let far = sine_gain(&mut filter, 100.0);
        assert!((far - 1.0).abs() < 0.02, "Expected unity far from the bell, got {far}");
    }

    #[test]
    fn test_low_shelf_boosts_bass_only() {
        let mut filter = Biquad::new();
        filter.set_coefficients(FilterShape::LowShelf { gain: 2.0 }, SR, 200.0, 0.7);

        let mut dc = 0.0;
        for _ in 0..20000 {
            dc = filter.process_sample(1.0);
        }
        assert!((dc - 2.0).abs() < 1e-3, "DC should see the full shelf gain, got {dc}");

        filter.reset();
        let treble = sine_gain(&mut filter, 8000.0);
        assert!((treble - 1.0).abs() < 0.02, "Treble should be untouched, got {treble}");
    }

    #[test]
    fn test_nan_design_keeps_previous_response() {
        let mut filter = Biquad::new();
        filter.set_coefficients(FilterShape::LowPass, SR, 1000.0, 0.7);
        let before = filter.coefficients;

        filter.set_coefficients(FilterShape::LowPass, SR, f64::NAN, 0.7);
        assert_eq!(filter.coefficients, before);

        filter.set_coefficients(FilterShape::LowShelf { gain: 2.0 }, SR, f64::NAN, 0.7);
        assert_eq!(filter.coefficients, before);
        assert!(filter.process_sample(1.0).is_finite());
    }

    /// Designing above Nyquist must still give a finite, stable filter.
    #[test]
    fn test_frequency_is_clamped_below_nyquist() {
        let mut filter = Biquad::new();
        filter.set_coefficients(FilterShape::LowPass, 16000.0, 10000.0, 0.5);

        let mut peak = 0.0_f32;
        for i in 0..10000 {
            let x = if i % 3 == 0 { 1.0 } else { -0.5 };
            peak = peak.max(filter.process_sample(x).abs());
        }
        assert!(peak.is_finite() && peak < 10.0, "Filter blew up: peak {peak}");
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut filter = Biquad::new();
        filter.set_coefficients(FilterShape::LowPass, SR, 500.0, 0.7);
        filter.process_sample(1.0);

        filter.reset();
        assert_eq!(filter.process_sample(0.0), 0.0);
    }
}
