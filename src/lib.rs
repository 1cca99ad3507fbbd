//! # Dome Live: An AU/VST3/CLAP Arena Reverb Plugin
//!
//! A one-knob reverb built with [nih-plug](https://github.com/robbert-vdh/nih-plug)
//! that turns a dry stereo mix into something that sounds like it is
//! playing in a dome, a stadium, a hall or a club. Outputs Audio Unit
//! (AUv2), VST3, and CLAP formats from a single codebase.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────────────── × dry ───┐
//!         │                                                          │
//!         └─► [Pre-EQ] ► [Pre-delay] ► [8 Combs ∥] ► [Crossfeed]      │
//!                                                       │            │
//!              ┌────────────────────────────────────────┘            │
//!              ▼                                                     │
//!         [4 All-pass] ► [Lowpass] ► [Bass shelf] ► [Width] ► × wet ►(+)──► Output
//! ```
//!
//! All of the DSP lives in [`dsp`]; this file only adapts it to the host.

pub mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::mapping::Preset;
use dsp::reverb::DomeReverb;
use nih_plug::prelude::*;
use params::PluginParams;

/// The main plugin struct.
///
/// Parameters (`PluginParams`) are shared with the host via `Arc` and can
/// be read from any thread. The reverb engine is owned by the audio
/// thread: parameter changes are picked up at the start of each
/// `process()` call and pushed into the engine there, so the engine only
/// ever has one writer.
struct DomeLive {
    params: Arc<PluginParams>,

    reverb: DomeReverb,

    /// The preset the engine was last switched to.
    applied_preset: Preset,

    /// The knob value the engine last saw.
    applied_dome_amount: f32,
}

impl Default for DomeLive {
    fn default() -> Self {
        let params = Arc::new(PluginParams::default());
        let applied_preset = params.preset.value();
        let applied_dome_amount = params.dome_amount.value();

        Self {
            params,
            reverb: DomeReverb::new(),
            applied_preset,
            applied_dome_amount,
        }
    }
}

impl DomeLive {
    /// Push both parameters into the engine unconditionally.
    fn apply_all_params(&mut self) {
        let preset = self.params.preset.value();
        let dome_amount = self.params.dome_amount.value();
        self.load_params(preset, dome_amount);
    }

    /// Forward whichever parameters changed since the last block.
    fn apply_changed_params(&mut self) {
        let preset = self.params.preset.value();
        let dome_amount = self.params.dome_amount.value();
        self.apply_params(preset, dome_amount);
    }

    fn load_params(&mut self, preset: Preset, dome_amount: f32) {
        self.applied_preset = preset;
        self.applied_dome_amount = dome_amount;

        self.reverb.set_preset(preset);
        self.reverb.set_dome_amount(dome_amount);
    }

    /// The knob is always applied after the preset. A preset brings its
    /// stereo width and bass boost, but the engine always runs at the
    /// dome amount the host saves, so a reloaded project sounds the same
    /// as it did when it was saved.
    fn apply_params(&mut self, preset: Preset, dome_amount: f32) {
        if preset != self.applied_preset {
            self.load_params(preset, dome_amount);
        } else if dome_amount != self.applied_dome_amount {
            self.applied_dome_amount = dome_amount;
            self.reverb.set_dome_amount(dome_amount);
        }
    }
}

impl Plugin for DomeLive {
    const NAME: &'static str = "Dome Live";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first, since the reverb is built around two decorrelated
    // channels. Mono tracks still work: both reverb sides hear the same
    // input and the left side is written back.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Coefficients are re-derived once per block, so splitting blocks at
    // automation points would only add work.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate every delay buffer for the host's sample rate and load
    /// the saved parameters into the engine.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = f64::from(buffer_config.sample_rate);
        let max_block_size = buffer_config.max_buffer_size as usize;

        nih_log!(
            "Preparing Dome Live at {sample_rate} Hz, up to {max_block_size} samples per block"
        );

        self.reverb.prepare(sample_rate, max_block_size);
        self.apply_all_params();

        true
    }

    /// Called when playback stops or the plugin is bypassed. Clearing
    /// the engine stops an old tail from bursting out on the next play.
    fn reset(&mut self) {
        self.reverb.clear();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.apply_changed_params();

        self.reverb.process(buffer.as_slice());

        // Keep the host calling us after the input stops so the tail
        // isn't cut off.
        ProcessStatus::Tail(self.reverb.tail_samples())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for DomeLive {
    const CLAP_ID: &'static str = "com.loveless-audio.dome-live";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A one-knob arena reverb with venue presets");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Reverb,
    ];
}

impl Vst3Plugin for DomeLive {
    // The `*b"..."` syntax turns a 16-character ASCII literal into the
    // `[u8; 16]` class ID VST3 requires.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssDomeLive001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Reverb];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// clap_wrapper re-exports the CLAP entry point as AUv2 so Logic Pro
// (Audio Units only) can load it.

nih_export_clap!(DomeLive);
nih_export_vst3!(DomeLive);
clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plugin_matches_engine_defaults() {
        let plugin = DomeLive::default();
        assert_eq!(plugin.applied_preset, Preset::Arena);
        assert_eq!(plugin.applied_dome_amount, 0.5);
        assert_eq!(plugin.reverb.dome_amount(), 0.5);
        assert_eq!(plugin.reverb.preset(), Preset::Arena);
    }

    /// A restored project keeps its saved knob position rather than the
    /// preset's built-in dome amount.
    #[test]
    fn test_saved_knob_wins_over_preset() {
        let mut plugin = DomeLive::default();
        plugin.apply_all_params();

        // Arena's own dome amount is 0.6; the default knob is 0.5.
        assert_eq!(plugin.reverb.dome_amount(), 0.5);
        assert_eq!(
            plugin.reverb.stereo_width(),
            Preset::Arena.settings().stereo_width
        );
    }

    /// Picking a preset live and reloading the saved project must leave
    /// the engine in the same state.
    #[test]
    fn test_preset_change_survives_reload() {
        let mut live = DomeLive::default();
        live.apply_all_params();
        live.apply_params(Preset::Stadium, 0.5);

        let mut restored = DomeLive::default();
        restored.load_params(Preset::Stadium, 0.5);

        assert_eq!(live.reverb.dome_amount(), 0.5);
        assert_eq!(live.reverb.dome_amount(), restored.reverb.dome_amount());
        assert_eq!(live.reverb.wet_gain(), restored.reverb.wet_gain());
        assert_eq!(live.reverb.stereo_width(), restored.reverb.stereo_width());
        assert_eq!(
            live.reverb.bass_boost(),
            Preset::Stadium.settings().bass_boost
        );
        assert_eq!(live.reverb.bass_boost(), restored.reverb.bass_boost());
    }

    #[test]
    fn test_knob_moves_after_preset() {
        let mut plugin = DomeLive::default();
        plugin.apply_all_params();
        plugin.apply_params(Preset::Club, 0.5);
        plugin.apply_params(Preset::Club, 0.9);

        assert_eq!(plugin.reverb.dome_amount(), 0.9);
        assert_eq!(plugin.reverb.preset(), Preset::Club);
        assert_eq!(
            plugin.reverb.stereo_width(),
            Preset::Club.settings().stereo_width
        );
    }

    #[test]
    fn test_unchanged_params_leave_engine_alone() {
        let mut plugin = DomeLive::default();
        plugin.reverb.set_dome_amount(0.9);

        // Nothing moved on the host side, so the engine keeps its value.
        plugin.apply_changed_params();
        assert_eq!(plugin.reverb.dome_amount(), 0.9);
    }
}
