//! # Plugin Parameters
//!
//! Dome Live exposes exactly two parameters to the host:
//!
//! - **Dome Amount**, the one knob. It scales everything at once: how
//!   much reverb is mixed in, how long the tail rings, how far the first
//!   reflections are pushed back, and how dark the space sounds.
//! - **Preset**, a venue selector that jumps the reverb to a fixed
//!   configuration (including stereo width and bass boost, which the
//!   knob never touches).
//!
//! Both are saved with the host project by their string IDs, so these
//! IDs must never change once published.
//!
//! Neither parameter uses a smoother. The engine re-derives its
//! coefficients once per block when a value changes, the same way a
//! preset switch is applied: an immediate jump.

use nih_plug::prelude::*;

use crate::dsp::mapping::Preset;

/// All user-facing parameters for Dome Live.
#[derive(Params)]
pub struct PluginParams {
    /// **Dome Amount**: 0% is completely dry, 100% is the biggest,
    /// darkest, wettest space.
    ///
    /// Range: 0.0 to 1.0, default 0.5. Stepped in 1% increments.
    #[id = "dome"]
    pub dome_amount: FloatParam,

    /// **Preset**: Arena, Stadium, Hall or Club. Default Arena.
    #[id = "preset"]
    pub preset: EnumParam<Preset>,
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            dome_amount: FloatParam::new(
                "Dome Amount",
                0.5,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_step_size(0.01)
            // Display as percentage: 0.50 → "50%"
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            preset: EnumParam::new("Preset", Preset::Arena),
        }
    }
}
