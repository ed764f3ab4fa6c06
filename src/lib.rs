//! # Loveless Flanger — An AU/VST3/CLAP Flanger Plugin
//!
//! A flanger built with [nih-plug](https://github.com/robbert-vdh/nih-plug):
//! the input is mixed with a copy of itself delayed by a few milliseconds,
//! and an LFO sweeps that delay back and forth. The moving comb filter this
//! creates is the "jet plane" whoosh.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬────────────────────────────────────────────── × dry ───┐
//!         │                                                        │
//!         │         ┌──────────── LFO (triangle) ────┐             │
//!         │         │                                ▼             │
//!         └──►(+)──► [Delay Line] ──────► tap(center ± variance) ──┤
//!              ▲                                 │                 │
//!              │                                 ▼                 │
//!              └──────────── × ±feedback ◄───────┤                 │
//!                                                │                 │
//!                                                └──── × wet ────►(+)──► Output
//! ```
//!
//! All DSP lives in [`dsp`]; this file is the host glue.

mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::kernel::Kernel;
use nih_plug::prelude::*;
use params::{FlangerParams, MAX_DELAY_MILLISECONDS};

/// The main plugin struct.
///
/// Parameters (`FlangerParams`) are shared with the host via `Arc` and can
/// be read from any thread. The kernel (delay lines and LFO) is owned by
/// the audio thread and only touched in `initialize()`, `reset()` and
/// `process()`, which the host never runs concurrently.
struct LovelessFlanger {
    params: Arc<FlangerParams>,
    kernel: Kernel,

    /// Per-channel copy of the block's input. nih-plug hands `process()` a
    /// single in-place buffer, and the kernel reads its inputs and writes
    /// its outputs as separate slices. Sized in `initialize()`.
    input_copy: Vec<Vec<f32>>,
}

impl Default for LovelessFlanger {
    fn default() -> Self {
        Self {
            params: Arc::new(FlangerParams::default()),
            // Unconfigured until initialize() knows the channel count and
            // sample rate.
            kernel: Kernel::new(),
            input_copy: Vec::new(),
        }
    }
}

impl Plugin for LovelessFlanger {
    const NAME: &'static str = "Loveless Flanger";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first: with "Odd 90°" enabled the right channel follows the
    // quadrature tap.
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

    // Sample-accurate automation splits buffers at every parameter event,
    // which is where the kernel's single-frame path comes from.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the kernel for the host's format. Returning `false` tells the
    /// host the configuration is unusable.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        let max_frames = buffer_config.max_buffer_size as usize;
        match self.kernel.configure(
            num_channels,
            f64::from(buffer_config.sample_rate),
            max_frames,
            MAX_DELAY_MILLISECONDS,
        ) {
            Ok(()) => {
                self.input_copy = vec![vec![0.0; max_frames]; num_channels];
                true
            }
            Err(err) => {
                nih_error!("cannot initialize flanger: {err}");
                false
            }
        }
    }

    /// Playback stopped: drop buffered audio so old echoes don't bleed
    /// into the next run.
    fn reset(&mut self) {
        self.kernel.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let frame_count = buffer.samples();
        let controls = self.params.controls(frame_count);

        let channels = buffer.as_slice();
        for (copy, channel) in self.input_copy.iter_mut().zip(channels.iter()) {
            copy[..frame_count].copy_from_slice(&channel[..frame_count]);
        }
        self.kernel
            .render(&controls, &self.input_copy, channels, frame_count);

        // Keep the host calling process() until the feedback loop has
        // decayed.
        ProcessStatus::Tail(self.kernel.tail_frames(controls.feedback.last))
    }
}

impl ClapPlugin for LovelessFlanger {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-flanger-v1";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A flanger with quadrature stereo taps and bipolar feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Flanger,
    ];
}

impl Vst3Plugin for LovelessFlanger {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssFlanger_v01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Modulation];
}

nih_export_clap!(LovelessFlanger);
nih_export_vst3!(LovelessFlanger);

// AUv2 entry point for Logic Pro, wrapped around the CLAP export.
clap_wrapper::export_auv2!();
