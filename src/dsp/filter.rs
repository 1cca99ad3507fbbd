//! # One-Pole Damping Filter
//!
//! A one-pole lowpass filter is the simplest possible IIR (Infinite Impulse
//! Response) filter. Inside every comb filter it sits on the feedback
//! path, so each trip around the loop loses a little more high end. That
//! is what makes the reverb tail darken as it decays, the way real rooms
//! absorb treble faster than bass.
//!
//! ## The Filter Equation
//!
//! ```text
//! y[n] = (1 - d) * x[n] + d * y[n-1]
//! ```
//!
//! Where `d` is the damping amount (0.0 to 1.0):
//!
//! - `d = 0.0` → output = input (no damping, bright tail)
//! - `d = 0.5` → equal mix of input and previous output
//! - `d → 1.0` → output ≈ previous output (extreme damping)
//!
//! Unlike a tone control, the reverb sets `d` directly from the dome
//! knob rather than from a cutoff in Hz, so there is no frequency-to-
//! coefficient conversion here.

/// A one-pole (6 dB/octave) lowpass used as comb-filter damping.
#[derive(Debug, Clone, Default)]
pub struct OnePoleFilter {
    /// The damping coefficient `d`. Range: 0.0 to 1.0.
    coefficient: f32,

    /// The previous output sample, the filter's only state variable.
    /// In the comb filter this is the "filter store" that persists
    /// between samples.
    prev_output: f32,
}

impl OnePoleFilter {
    /// Create a new filter initialized to passthrough (no damping).
    pub fn new() -> Self {
        Self {
            coefficient: 0.0,
            prev_output: 0.0,
        }
    }

    /// Set the damping coefficient, clamped to `[0, 1]`. NaN is ignored.
    pub fn set_coefficient(&mut self, coefficient: f32) {
        if coefficient.is_nan() {
            return;
        }
        self.coefficient = coefficient.clamp(0.0, 1.0);
    }

    /// Current damping coefficient.
    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    /// Process one sample through the filter.
    pub fn process(&mut self, input: f32) -> f32 {
        let output = (1.0 - self.coefficient) * input + self.coefficient * self.prev_output;
        self.prev_output = output;
        output
    }

    /// Reset the filter memory to zero.
    pub fn reset(&mut self) {
        self.prev_output = 0.0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
