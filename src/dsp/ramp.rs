//! # Ramped Parameters
//!
//! Parameter smoothing itself is the host adapter's job (nih-plug's
//! smoothers do it in `params.rs`). The kernel only needs to *read* a
//! smoothed control, and it reads it one of two ways:
//!
//! - **frame value**: the smoothed value for the one frame being rendered.
//!   Used when the host asks for a single-frame block.
//! - **final value**: where the ramp lands at the end of the block. Used
//!   once for every multi-frame block.
//!
//! Switches are never ramped. They travel as plain values in [`Controls`]
//! and the kernel reads them once per render call.

use super::lfo::LfoWaveform;

/// Read-only view of one smoothed control for the current render call.
pub trait RampedParameter {
    /// Smoothed value for the frame currently being rendered.
    fn frame_value(&self) -> f32;

    /// Smoothed value at the end of the current block.
    fn final_value(&self) -> f32;
}

/// A snapshot of one control, taken by the host adapter before each
/// render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    /// Value for a single-frame render.
    pub frame: f32,
    /// Value at the end of a multi-frame block.
    pub last: f32,
}

impl RampedParameter for Ramp {
    #[inline]
    fn frame_value(&self) -> f32 {
        self.frame
    }

    #[inline]
    fn final_value(&self) -> f32 {
        self.last
    }
}

/// Every control the flanger kernel reads during a render call.
///
/// Passing this by reference into `render()` keeps the audio thread free
/// of any shared lookup table: the kernel sees exactly the values the host
/// adapter snapshotted for this call, and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct Controls<R> {
    /// Modulator frequency, Hz.
    pub rate: R,
    /// Nominal (shortest) delay, ms.
    pub delay: R,
    /// Modulation extent, 0..=1. Zero pins the tap at `delay`.
    pub depth: R,
    /// Feedback magnitude, 0..=1. The sign comes from `negative_feedback`.
    pub feedback: R,
    /// Gain on the delayed signal in the output. Independent of `dry_mix`;
    /// the two do not have to sum to 1.
    pub wet_mix: R,
    /// Gain on the untouched input in the output.
    pub dry_mix: R,
    /// Invert the feedback signal.
    pub negative_feedback: bool,
    /// Feed odd channels from the quadrature tap.
    pub odd90: bool,
    /// LFO shape.
    pub waveform: LfoWaveform,
}
