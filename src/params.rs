//! # Plugin Parameters
//!
//! The flanger exposes nine controls. Their identity lives in one ordered
//! registry, [`PARAMETERS`], which fixes each control's kind and default.
//! The nih-plug [`FlangerParams`] struct is built from that registry: the
//! kind picks the unit and formatting, and the default seeds the param, so
//! the host-facing controls cannot drift apart from it.
//!
//! Once published, never change an `#[id]` or existing presets will break.
//!
//! ## Smoothing
//!
//! The float controls ramp linearly toward new values. Switches and the
//! LFO shape change immediately; the kernel reads them once per render call.

use nih_plug::prelude::*;

use crate::dsp::lfo::LfoWaveform;
use crate::dsp::ramp::{Controls, Ramp};

/// How a control's value is interpreted and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Hertz,
    Milliseconds,
    /// Stored as a 0..=1 fraction, shown as 0..=100%.
    Percentage,
    Bool,
    /// One of a fixed list of options. The default is the option's index.
    Choice,
}

/// Stable address of every flanger control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterAddress {
    Rate,
    Delay,
    Depth,
    Feedback,
    WetMix,
    DryMix,
    NegativeFeedback,
    Odd90,
    Waveform,
}

/// One registry entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDef {
    pub address: ParameterAddress,
    pub kind: ParameterKind,
    pub default: f32,
}

/// Every control, in host order.
pub static PARAMETERS: [ParameterDef; 9] = [
    ParameterDef {
        address: ParameterAddress::Rate,
        kind: ParameterKind::Hertz,
        default: 0.15,
    },
    ParameterDef {
        address: ParameterAddress::Delay,
        kind: ParameterKind::Milliseconds,
        default: 5.0,
    },
    ParameterDef {
        address: ParameterAddress::Depth,
        kind: ParameterKind::Percentage,
        default: 0.5,
    },
    ParameterDef {
        address: ParameterAddress::Feedback,
        kind: ParameterKind::Percentage,
        default: 0.0,
    },
    ParameterDef {
        address: ParameterAddress::WetMix,
        kind: ParameterKind::Percentage,
        default: 0.5,
    },
    ParameterDef {
        address: ParameterAddress::DryMix,
        kind: ParameterKind::Percentage,
        default: 0.5,
    },
    ParameterDef {
        address: ParameterAddress::NegativeFeedback,
        kind: ParameterKind::Bool,
        default: 0.0,
    },
    ParameterDef {
        address: ParameterAddress::Odd90,
        kind: ParameterKind::Bool,
        default: 0.0,
    },
    ParameterDef {
        address: ParameterAddress::Waveform,
        kind: ParameterKind::Choice,
        // LfoWaveform::Triangle
        default: 1.0,
    },
];

/// Longest delay the flanger can sweep to. Matches the top of the delay
/// control's range so a full-depth sweep from any delay stays in bounds.
pub const MAX_DELAY_MILLISECONDS: f64 = 10.0;

impl ParameterAddress {
    /// Name shown in the host.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Rate => "Rate",
            Self::Delay => "Delay",
            Self::Depth => "Depth",
            Self::Feedback => "Feedback",
            Self::WetMix => "Wet",
            Self::DryMix => "Dry",
            Self::NegativeFeedback => "-Feedback",
            Self::Odd90 => "Odd 90°",
            Self::Waveform => "Shape",
        }
    }

    pub fn def(self) -> &'static ParameterDef {
        // The registry is ordered by address.
        let def = &PARAMETERS[self as usize];
        nih_debug_assert_eq!(def.address, self);
        def
    }

    pub fn default_value(self) -> f32 {
        self.def().default
    }
}

/// All user-facing parameters for the Loveless Flanger plugin.
#[derive(Params)]
pub struct FlangerParams {
    /// **Rate**: LFO speed in Hz. Slow rates give the classic jet sweep;
    /// fast ones turn into vibrato.
    #[id = "rate"]
    pub rate: FloatParam,

    /// **Delay**: the shortest delay the sweep reaches, in ms.
    #[id = "delay"]
    pub delay: FloatParam,

    /// **Depth**: how much of the room between `delay` and the max delay
    /// the sweep covers.
    #[id = "depth"]
    pub depth: FloatParam,

    /// **Feedback**: how much of the delayed signal re-enters the line.
    /// Capped below 100% so the comb resonance always decays.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Wet**: level of the swept, delayed signal in the output.
    #[id = "wetMix"]
    pub wet_mix: FloatParam,

    /// **Dry**: level of the untouched input in the output. Wet and dry
    /// are independent, so 100% of each is a valid (louder) mix.
    #[id = "dryMix"]
    pub dry_mix: FloatParam,

    /// Invert the feedback signal, moving the comb peaks to even
    /// harmonics.
    #[id = "negativeFeedback"]
    pub negative_feedback: BoolParam,

    /// Drive odd channels from an LFO tap 90° ahead of the even ones.
    #[id = "odd90"]
    pub odd90: BoolParam,

    /// **Shape**: the LFO waveform. Triangle is the classic flanger sweep.
    #[id = "waveform"]
    pub waveform: EnumParam<LfoWaveform>,
}

impl Default for FlangerParams {
    fn default() -> Self {
        Self {
            rate: float_param(
                ParameterAddress::Rate,
                FloatRange::Skewed {
                    min: 0.01,
                    max: 10.0,
                    factor: FloatRange::skew_factor(-2.0),
                },
            ),
            delay: float_param(
                ParameterAddress::Delay,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_DELAY_MILLISECONDS as f32,
                },
            ),
            depth: float_param(ParameterAddress::Depth, FloatRange::Linear { min: 0.0, max: 1.0 }),
            feedback: float_param(
                ParameterAddress::Feedback,
                FloatRange::Linear { min: 0.0, max: 0.99 },
            ),
            wet_mix: float_param(ParameterAddress::WetMix, FloatRange::Linear { min: 0.0, max: 1.0 }),
            dry_mix: float_param(ParameterAddress::DryMix, FloatRange::Linear { min: 0.0, max: 1.0 }),

            negative_feedback: bool_param(ParameterAddress::NegativeFeedback),
            odd90: bool_param(ParameterAddress::Odd90),

            waveform: EnumParam::new(
                ParameterAddress::Waveform.display_name(),
                LfoWaveform::from_index(ParameterAddress::Waveform.default_value() as usize),
            ),
        }
    }
}

impl FlangerParams {
    /// Snapshot every control for a render call of `frame_count` frames,
    /// stepping each smoother to the end of the block.
    ///
    /// For a single frame the frame value and the block-final value are the
    /// same smoothed step.
    pub fn controls(&self, frame_count: usize) -> Controls<Ramp> {
        let steps = frame_count.max(1) as u32;
        Controls {
            rate: ramp(&self.rate, steps),
            delay: ramp(&self.delay, steps),
            depth: ramp(&self.depth, steps),
            feedback: ramp(&self.feedback, steps),
            wet_mix: ramp(&self.wet_mix, steps),
            dry_mix: ramp(&self.dry_mix, steps),
            negative_feedback: self.negative_feedback.value(),
            odd90: self.odd90.value(),
            waveform: self.waveform.value(),
        }
    }
}

fn ramp(param: &FloatParam, steps: u32) -> Ramp {
    let value = param.smoothed.next_step(steps);
    Ramp {
        frame: value,
        last: value,
    }
}

/// Build a smoothed float control, decorated for its registry kind.
fn float_param(address: ParameterAddress, range: FloatRange) -> FloatParam {
    let def = address.def();
    let param = FloatParam::new(address.display_name(), def.default, range)
        .with_smoother(SmoothingStyle::Linear(20.0));

    match def.kind {
        ParameterKind::Hertz => param
            .with_unit(" Hz")
            .with_value_to_string(formatters::v2s_f32_rounded(2)),
        ParameterKind::Milliseconds => param.with_unit(" ms").with_step_size(0.01),
        ParameterKind::Percentage => param
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),
        ParameterKind::Bool | ParameterKind::Choice => {
            nih_debug_assert_failure!("{address:?} is not a float control");
            param
        }
    }
}

fn bool_param(address: ParameterAddress) -> BoolParam {
    let def = address.def();
    nih_debug_assert_eq!(def.kind, ParameterKind::Bool);
    BoolParam::new(address.display_name(), def.default > 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_ordered_by_address() {
        for (index, def) in PARAMETERS.iter().enumerate() {
            assert_eq!(def.address as usize, index);
            assert_eq!(def.address.def(), def);
        }
    }

    #[test]
    fn test_host_ids_are_stable() {
        let params = FlangerParams::default();
        let ids: Vec<String> = params.param_map().into_iter().map(|(id, _, _)| id).collect();

        assert_eq!(
            ids,
            [
                "rate",
                "delay",
                "depth",
                "feedback",
                "wetMix",
                "dryMix",
                "negativeFeedback",
                "odd90",
                "waveform",
            ]
        );
        assert_eq!(ids.len(), PARAMETERS.len());
    }

    #[test]
    fn test_defaults_come_from_registry() {
        let params = FlangerParams::default();

        assert_eq!(params.rate.default_plain_value(), ParameterAddress::Rate.default_value());
        assert_eq!(params.delay.default_plain_value(), 5.0);
        assert_eq!(params.depth.default_plain_value(), 0.5);
        assert_eq!(params.feedback.default_plain_value(), 0.0);
        assert_eq!(params.wet_mix.default_plain_value(), 0.5);
        assert_eq!(params.dry_mix.default_plain_value(), 0.5);
        assert!(!params.negative_feedback.value());
        assert!(!params.odd90.value());
        assert_eq!(params.waveform.value(), LfoWaveform::Triangle);
    }

    #[test]
    fn test_choice_default_is_an_option_index() {
        let default = ParameterAddress::Waveform.default_value() as usize;
        assert_eq!(LfoWaveform::from_index(default), LfoWaveform::default());
        assert_eq!(LfoWaveform::variants()[default], "Triangle");
    }

    #[test]
    fn test_kind_selects_unit() {
        let params = FlangerParams::default();

        assert_eq!(params.rate.unit(), " Hz");
        assert_eq!(params.delay.unit(), " ms");
        assert_eq!(params.wet_mix.unit(), "%");
        assert_eq!(ParameterAddress::Odd90.def().kind, ParameterKind::Bool);
        assert_eq!(ParameterAddress::Waveform.def().kind, ParameterKind::Choice);
    }

    #[test]
    fn test_controls_snapshot_switches() {
        let params = FlangerParams::default();
        let controls = params.controls(64);

        assert!(!controls.negative_feedback);
        assert!(!controls.odd90);
        assert_eq!(controls.waveform, LfoWaveform::Triangle);
        // Frame and final values come from the same smoother step.
        assert_eq!(controls.delay.frame, controls.delay.last);
    }
}
