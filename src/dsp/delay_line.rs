//! # Delay Line (Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! fixed number of samples. Every time-based block in the reverb (comb
//! filters, all-pass filters, pre-delay) is built on one of these.
//!
//! ## How a Ring Buffer Works
//!
//! Imagine a circular tape loop. A "write head" records incoming audio
//! onto the tape, and a "read head" plays it back from a position further
//! behind on the tape. The distance between the two heads determines the
//! delay time.
//!
//! Each time we process one audio sample:
//!
//! 1. Read the delayed sample from `(write_pos - delay_samples)`,
//!    wrapping around to the end of the buffer if we go past the start.
//! 2. Write the new sample at `write_pos`.
//! 3. Advance `write_pos` by 1, wrapping back to 0 at the end.
//!
//! ## Whole-sample delays only
//!
//! Reverb delay lengths never move while audio is running (only the
//! feedback and damping amounts do), so there is no need for fractional
//! reads. Reading a whole sample keeps the comb's feedback latency exact:
//! the value read is always the one written `delay_samples` calls ago.

/// Convert a delay time in milliseconds into whole samples.
///
/// ```text
/// samples = floor(ms * sample_rate / 1000)
/// ```
///
/// At 44100 Hz, 29.7 ms → 1309 samples.
pub fn ms_to_samples(delay_ms: f32, sample_rate: f64) -> usize {
    let samples = f64::from(delay_ms) * sample_rate / 1000.0;
    // Negative or NaN inputs saturate to 0 in the `as` cast.
    samples as usize
}

/// A fixed-capacity ring buffer with one write cursor and a read offset.
///
/// The buffer is allocated once in [`configure()`](Self::configure) and
/// never again: changing the delay length only moves the read position.
/// This is what makes it safe to retune a delay line from the audio
/// thread.
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// The circular buffer storing audio samples. Always holds the last
    /// `buffer.len()` samples written.
    buffer: Vec<f32>,

    /// Where the next incoming sample will be stored.
    write_pos: usize,

    /// Distance between the write head and the read head, in samples.
    /// Always in `[1, capacity - 1]`.
    delay_samples: usize,

    /// Sample rate the buffer was sized for. Used to convert
    /// millisecond delay times.
    sample_rate: f64,
}

impl DelayLine {
    /// The smallest buffer we ever allocate. Two slots is the minimum
    /// for a 1-sample delay to be distinct from the write position.
    const MIN_CAPACITY: usize = 2;

    /// Create an unconfigured delay line.
    ///
    /// It already has the minimum two-slot buffer so that reading from it
    /// before `configure()` returns silence instead of panicking.
    pub fn new() -> Self {
        Self {
            buffer: vec![0.0; Self::MIN_CAPACITY],
            write_pos: 0,
            delay_samples: 1,
            sample_rate: 44_100.0,
        }
    }

    /// Size the buffer for `max_delay_ms` at `sample_rate` and zero it.
    ///
    /// Capacity is `floor(max_delay_ms * sample_rate / 1000)` samples.
    /// The write cursor goes back to 0 and the current delay length is
    /// re-clamped against the new capacity.
    ///
    /// This allocates, so it must only be called while audio processing
    /// is stopped.
    pub fn configure(&mut self, sample_rate: f64, max_delay_ms: f32) {
        self.sample_rate = sample_rate;
        let capacity = ms_to_samples(max_delay_ms, sample_rate).max(Self::MIN_CAPACITY);

        self.buffer.clear();
        self.buffer.resize(capacity, 0.0);
        self.write_pos = 0;
        self.set_delay_samples(self.delay_samples);
    }

    /// Set the delay length in samples, clamped to `[1, capacity - 1]`.
    pub fn set_delay_samples(&mut self, samples: usize) {
        self.delay_samples = samples.clamp(1, self.capacity() - 1);
    }

    /// Set the delay length from a time in milliseconds, using the sample
    /// rate from the last `configure()`.
    pub fn set_delay_ms(&mut self, delay_ms: f32) {
        self.set_delay_samples(ms_to_samples(delay_ms, self.sample_rate));
    }

    /// Total number of samples the buffer holds.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Current delay length in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Read the sample written `delay_samples` writes ago.
    ///
    /// # How the index math works
    ///
    /// ```text
    /// read_index = (write_pos + capacity - delay_samples) % capacity
    /// ```
    ///
    /// We add `capacity` before subtracting so the result never goes
    /// negative (`usize` can't). Since `delay_samples < capacity`, one
    /// addition is always enough.
    pub fn read(&self) -> f32 {
        let capacity = self.capacity();
        let read_pos = (self.write_pos + capacity - self.delay_samples) % capacity;
        self.buffer[read_pos]
    }

    /// Write a sample at the current write position.
    ///
    /// **Important:** This does NOT advance the write position. Call
    /// [`advance()`](Self::advance) after both `read()` and `write()` are
    /// complete for the current sample, so the old value is read before
    /// it gets overwritten.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Advance the write position by one sample, wrapping at capacity.
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.capacity();
    }

    /// Zero the buffer and reset the write position. Does not reallocate.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Push one sample through with the read-write-advance pattern.
    fn tick(dl: &mut DelayLine, input: f32) -> f32 {
        let out = dl.read();
        dl.write(input);
        dl.advance();
        out
    }

    #[test]
    fn test_configure_sizes_buffer_from_time() {
        let mut dl = DelayLine::new();
        dl.configure(44100.0, 150.0);
        // floor(150 * 44100 / 1000) = 6615
        assert_eq!(dl.capacity(), 6615);

        dl.configure(48000.0, 30.0);
        assert_eq!(dl.capacity(), 1440);
    }

    #[test]
    fn test_delay_is_clamped_into_buffer() {
        let mut dl = DelayLine::new();
        dl.configure(1000.0, 10.0); // 10 samples

        dl.set_delay_samples(0);
        assert_eq!(dl.delay_samples(), 1, "Delay must be at least 1 sample");

        dl.set_delay_samples(50);
        assert_eq!(dl.delay_samples(), 9, "Delay must stay below capacity");

        dl.set_delay_ms(4.9);
        assert_eq!(dl.delay_samples(), 4, "Milliseconds are floored to samples");
    }

    /// A sample written now comes back out exactly `delay` ticks later.
    #[test]
    fn test_impulse_returns_after_delay() {
        let mut dl = DelayLine::new();
        dl.configure(1000.0, 20.0);
        dl.set_delay_samples(5);

        let mut outputs = Vec::new();
        outputs.push(tick(&mut dl, 1.0));
        for _ in 0..9 {
            outputs.push(tick(&mut dl, 0.0));
        }

        for (n, &out) in outputs.iter().enumerate() {
            let expected = if n == 5 { 1.0 } else { 0.0 };
            assert!(
                (out - expected).abs() < 1e-6,
                "Sample {n}: expected {expected}, got {out}"
            );
        }
    }

    /// Verify the buffer wraps correctly past its boundaries.
    #[test]
    fn test_wrapping() {
        let mut dl = DelayLine::new();
        dl.configure(1000.0, 4.0); // capacity 4
        dl.set_delay_samples(1);

        // After 6 writes into a size-4 buffer the write head is at 2 and
        // slot 1 holds the most recent value (5.0).
        for i in 0..6 {
            dl.write(i as f32);
            dl.advance();
        }
        assert!((dl.read() - 5.0).abs() < 1e-6, "Expected 5.0, got {}", dl.read());

        dl.set_delay_samples(3);
        assert!((dl.read() - 3.0).abs() < 1e-6, "Expected 3.0, got {}", dl.read());
    }

    #[test]
    fn test_clear_silences_without_resizing() {
        let mut dl = DelayLine::new();
        dl.configure(1000.0, 10.0);
        dl.set_delay_samples(1);

        tick(&mut dl, 0.5);
        dl.clear();

        assert_eq!(dl.capacity(), 10);
        assert!(dl.read().abs() < 1e-6, "Expected silence after clear");
    }

    #[test]
    fn test_reconfigure_keeps_delay_valid() {
        let mut dl = DelayLine::new();
        dl.configure(1000.0, 100.0);
        dl.set_delay_samples(80);

        // Shrinking the buffer pulls the delay back under the new capacity.
        dl.configure(1000.0, 20.0);
        assert_eq!(dl.delay_samples(), 19);
    }

    #[test]
    fn test_unconfigured_line_reads_silence() {
        let dl = DelayLine::new();
        assert!(dl.read().abs() < 1e-6);
    }
}
