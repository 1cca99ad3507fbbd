//! # DSP (Digital Signal Processing)
//!
//! Everything that touches audio, leaves first:
//!
//! - **`delay_line`**: A ring buffer that stores past samples and reads
//!   them back a whole number of samples later. Combs, all-passes and the
//!   pre-delay are all built on it.
//!
//! - **`filter`**: The one-pole lowpass that damps each comb's feedback.
//!
//! - **`biquad`**: Second-order filters (lowpass, low shelf, peaking) for
//!   the pre-EQ and the tone shaping.
//!
//! - **`comb`** / **`allpass`**: The two reverb building blocks. Combs
//!   supply the echo density, all-passes smear it into a smooth tail.
//!
//! - **`mapping`**: The one-knob curves and the venue presets.
//!
//! - **`reverb`**: The stereo engine that wires it all together.

pub mod allpass;
pub mod biquad;
pub mod comb;
pub mod delay_line;
pub mod filter;
pub mod mapping;
pub mod reverb;
