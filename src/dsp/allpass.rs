//! # All-Pass Filter
//!
//! A Schroeder all-pass passes every frequency at the same level and only
//! shifts phase. Chained after the comb bank it smears each echo into
//! many closely spaced ones, which turns the combs' metallic ringing into
//! a smooth diffuse tail without colouring the spectrum.
//!
//! ```text
//! buf[n] = x[n] + g * buf[n - D]
//! y[n]   = buf[n - D] - g * buf[n]
//! ```
//!
//! which has the transfer function `(-g + z^-D) / (1 - g z^-D)`: its
//! numerator and denominator mirror each other, so `|H| = 1` everywhere.

use super::delay_line::DelayLine;

/// Highest coefficient accepted. Beyond this the impulse response rings
/// for too long to sound like diffusion.
pub const MAX_COEFFICIENT: f32 = 0.9;

#[derive(Debug, Clone)]
pub struct AllPassFilter {
    delay_line: DelayLine,
    coefficient: f32,
}

impl AllPassFilter {
    pub fn new() -> Self {
        Self {
            delay_line: DelayLine::new(),
            coefficient: 0.5,
        }
    }

    /// Allocate the delay buffer for `max_delay_ms` at `sample_rate`.
    pub fn prepare(&mut self, sample_rate: f64, max_delay_ms: f32) {
        self.delay_line.configure(sample_rate, max_delay_ms);
    }

    pub fn set_delay_ms(&mut self, delay_ms: f32) {
        self.delay_line.set_delay_ms(delay_ms);
    }

    /// Set the diffusion coefficient `g`, clamped to `[0, 0.9]`. NaN is
    /// ignored.
    pub fn set_coefficient(&mut self, coefficient: f32) {
        if coefficient.is_nan() {
            return;
        }
        self.coefficient = coefficient.clamp(0.0, MAX_COEFFICIENT);
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    /// Process one sample.
    ///
    /// `delayed` is read before anything is written because it feeds
    /// both the output and the new buffer value.
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay_line.read();
        let stored = input + self.coefficient * delayed;
        let output = delayed - self.coefficient * stored;
        self.delay_line.write(stored);
        self.delay_line.advance();
        output
    }

    pub fn clear(&mut self) {
        self.delay_line.clear();
    }
}

impl Default for AllPassFilter {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
