//! # Low Frequency Oscillator
//!
//! The flanger's sweep comes from an LFO: an oscillator running far below
//! the audible range (typically 0.05 Hz to a few Hz) whose output moves the
//! delay tap back and forth.
//!
//! ## Phase Accumulation
//!
//! The oscillator keeps a phase in `[0, 1)` and adds
//! `frequency / sample_rate` to it once per sample, wrapping at 1. The
//! waveform is then a pure function of the phase, so one full cycle takes
//! exactly `sample_rate / frequency` samples.
//!
//! ## Quadrature
//!
//! [`Lfo::quad_phase_value`] evaluates the same waveform a quarter cycle
//! ahead (90°). Feeding the left channel from `value()` and the right
//! from `quad_phase_value()` makes the two sweeps chase each other, which
//! widens the stereo image without a second oscillator.

use std::f32::consts::TAU;

use nih_plug::prelude::Enum;

/// Shape of the modulation signal. All shapes are bipolar, in `[-1, 1]`.
///
/// Derives nih-plug's `Enum` so the host can offer it as a choice control.
/// The `#[id]`s are stored in presets; never change them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Enum)]
pub enum LfoWaveform {
    /// Smooth sinusoidal sweep.
    #[id = "sine"]
    Sine,
    /// Constant-speed sweep up and down. The classic flanger shape.
    #[default]
    #[id = "triangle"]
    Triangle,
    /// Rising ramp with an instant reset.
    #[id = "sawtooth"]
    #[name = "Saw"]
    Sawtooth,
    /// Hard switch between the two extremes.
    #[id = "square"]
    Square,
}

impl LfoWaveform {
    /// Evaluate the waveform at `phase` (`[0, 1)`).
    ///
    /// The triangle starts at its minimum so that a reset oscillator sits
    /// at the shortest delay: `-1` at phase 0, `+1` at phase 0.5.
    #[inline]
    fn at(self, phase: f32) -> f32 {
        match self {
            Self::Sine => (phase * TAU).sin(),
            Self::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Self::Sawtooth => 2.0 * phase - 1.0,
            Self::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// A phase-accumulating oscillator with a 90° sibling output.
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Position within the current cycle, `[0, 1)`.
    phase: f32,

    /// Waveform value at `phase`, refreshed whenever the phase moves.
    value: f32,

    /// Fixed per render format; only `configure()` changes it.
    sample_rate: f32,

    /// Hz. Follows the rate control every render call.
    frequency: f32,

    waveform: LfoWaveform,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(44100.0, 1.0)
    }
}

impl Lfo {
    /// Create a triangle LFO at phase 0.
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        let waveform = LfoWaveform::default();
        Self {
            phase: 0.0,
            value: waveform.at(0.0),
            sample_rate,
            frequency,
            waveform,
        }
    }

    /// Change the sample rate and restart the cycle.
    ///
    /// Only called while the host is (re)configuring the plugin, so
    /// restarting here keeps every configuration deterministic.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    /// Switch shape without moving the phase.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
        self.value = waveform.at(self.phase);
    }

    /// Set the oscillation frequency in Hz.
    ///
    /// Zero or negative frequencies freeze the oscillator where it is.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Jump to `phase`, wrapped into `[0, 1)`.
    pub fn set_phase(&mut self, phase: f32) {
        let phase = phase.rem_euclid(1.0);
        // `rem_euclid` rounds tiny negative inputs up to exactly 1.0.
        self.phase = if phase >= 1.0 { 0.0 } else { phase };
        self.value = self.waveform.at(self.phase);
    }

    /// Back to the start of the cycle.
    pub fn reset(&mut self) {
        self.set_phase(0.0);
    }

    /// Current output, in `[-1, 1]`.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Output a quarter cycle ahead of [`value`](Self::value).
    #[inline]
    pub fn quad_phase_value(&self) -> f32 {
        let mut phase = self.phase + 0.25;
        if phase >= 1.0 {
            phase -= 1.0;
        }
        self.waveform.at(phase)
    }

    /// Advance by one sample.
    #[inline]
    pub fn increment(&mut self) {
        if self.frequency <= 0.0 || self.sample_rate <= 0.0 {
            return;
        }

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            // A single subtraction is enough for sane rates; `rem_euclid`
            // covers frequencies above the sample rate.
            self.phase -= 1.0;
            if self.phase >= 1.0 {
                self.phase = self.phase.rem_euclid(1.0);
            }
        }
        self.value = self.waveform.at(self.phase);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
