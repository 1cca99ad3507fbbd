//! # Comb Filter
//!
//! A feedback comb filter is a delay line whose output is fed back into
//! its own input. An impulse comes out again every `delay` samples, a
//! little quieter each time, which sounds like a train of echoes from
//! one wall. Eight of these in parallel, each with a different delay
//! length, overlap into the dense wash of a reverb tail.
//!
//! ```text
//! input ──►(+)──► [Delay Line] ──┬──► output
//!           ▲                    │
//!           └── × feedback ◄── [Damping] ◄──┘
//! ```
//!
//! The damping stage is a one-pole lowpass in the loop, so high
//! frequencies die away faster than lows.

use super::delay_line::DelayLine;
use super::filter::OnePoleFilter;

/// Highest feedback a comb will accept. Anything at or above 1.0 would
/// never decay.
pub const MAX_FEEDBACK: f32 = 0.99;

/// A damped feedback comb filter.
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay_line: DelayLine,
    /// Feedback gain, `[0, 0.99]`.
    feedback: f32,
    /// Lowpass in the feedback path. Its memory is the comb's filter store.
    damping: OnePoleFilter,
}

impl CombFilter {
    pub fn new() -> Self {
        let mut damping = OnePoleFilter::new();
        damping.set_coefficient(0.5);
        Self {
            delay_line: DelayLine::new(),
            feedback: 0.7,
            damping,
        }
    }

    /// Allocate the delay buffer for `max_delay_ms` at `sample_rate`.
    pub fn prepare(&mut self, sample_rate: f64, max_delay_ms: f32) {
        self.delay_line.configure(sample_rate, max_delay_ms);
        self.damping.reset();
    }

    pub fn set_delay_ms(&mut self, delay_ms: f32) {
        self.delay_line.set_delay_ms(delay_ms);
    }

    /// Clamped to `[0, MAX_FEEDBACK]`. NaN is ignored.
    pub fn set_feedback(&mut self, feedback: f32) {
        if feedback.is_nan() {
            return;
        }
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping.set_coefficient(damping);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn damping(&self) -> f32 {
        self.damping.coefficient()
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_line.delay_samples()
    }

    /// Process one sample.
    ///
    /// The order matters: the delayed value is read *before* the new
    /// value is written, and that delayed value is also the output. The
    /// loop therefore has exactly `delay_samples` of latency.
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay_line.read();
        let filtered = self.damping.process(delayed);
        self.delay_line.write(input + filtered * self.feedback);
        self.delay_line.advance();
        delayed
    }

    /// Zero the delay buffer and the damping memory.
    pub fn clear(&mut self) {
        self.delay_line.clear();
        self.damping.reset();
    }
}

impl Default for CombFilter {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
