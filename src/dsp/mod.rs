//! # DSP (Digital Signal Processing) Primitives
//!
//! - **`delay_line`**: a ring buffer read at fractional offsets.
//! - **`lfo`**: the low frequency oscillator that sweeps the delay tap.
//! - **`ramp`**: the read-only view of smoothed controls the kernel uses.
//! - **`kernel`**: the flanger render loop tying the three together.

pub mod delay_line;
pub mod kernel;
pub mod lfo;
pub mod ramp;
