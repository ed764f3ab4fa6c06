//! # Flanger Kernel
//!
//! The per-sample render loop. Each output frame is built in four steps:
//!
//! 1. Ask the LFO where the delay tap should be right now.
//! 2. Read each channel's delay line at that (fractional) tap.
//! 3. Write the input, plus a scaled copy of what was just read, back
//!    into the delay line. That scaled copy is the feedback path.
//! 4. Emit `wet * delayed + dry * input`.
//!
//! ```text
//! Input ──┬──────────────────────────────────────────── × dry ───┐
//!         │                                                      │
//!         └──►(+)──► [Delay Line] ──┬── tap(LFO) ────── × wet ──►(+)──► Output
//!              ▲                    │
//!              └──── × ±feedback ◄──┘
//! ```
//!
//! ## Sweep range
//!
//! The `delay` control is the *shortest* delay the sweep reaches. The
//! sweep then spans `depth` of the remaining room up to the maximum:
//!
//! ```text
//! variance = (max_delay - delay) * depth / 2
//! center   = delay + variance
//! tap_ms   = center + lfo * variance      (lfo ∈ [-1, 1])
//! ```
//!
//! so the tap always stays inside `[delay, max_delay]`, which is what the
//! delay lines are sized for.
//!
//! ## Parameter sourcing
//!
//! Hosts sometimes render a single frame at a time (sample-accurate
//! automation splits blocks at every parameter event). Those frames read
//! each control's per-frame smoothed value. Any longer block evaluates the
//! controls once, from their block-final values, and holds them for the
//! whole block while the LFO keeps moving every frame.

use nih_plug::{nih_debug_assert, nih_debug_assert_failure, nih_log};
use thiserror::Error;

use super::delay_line::DelayLine;
use super::lfo::{Lfo, LfoWaveform};
use super::ramp::{Controls, RampedParameter};

/// A render format the kernel refuses to configure itself for.
///
/// These are caught while the host is setting the plugin up, never on the
/// audio thread: once `configure()` succeeds, `render()` has no failure
/// modes left.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigureError {
    #[error("channel count must be at least 1")]
    ZeroChannels,

    #[error("sample rate must be a positive number of Hz, got {0}")]
    InvalidSampleRate(f64),

    #[error("max delay must be a positive number of milliseconds, got {0}")]
    InvalidMaxDelay(f64),

    #[error("max frames per block must be at least 1")]
    ZeroMaxFrames,
}

/// Format settings fixed by the last successful `configure()`.
///
/// Read by every frame of every render call, and changed only while the
/// host has rendering suspended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Largest `frame_count` the host promised to pass to `render()`.
    pub max_frames_per_block: usize,

    /// Top of the sweep. The delay lines hold exactly this much audio.
    pub max_delay_milliseconds: f32,

    /// Converts tap positions from milliseconds to samples.
    pub samples_per_millisecond: f32,
}

/// The flanger's audio-thread state: one delay line per channel and the
/// shared LFO.
///
/// Everything here is allocated in `configure()`. `render()` only reads and
/// writes what already exists, which is what keeps it real-time safe.
#[derive(Debug, Clone, Default)]
pub struct Kernel {
    /// `None` until the first successful `configure()`.
    context: Option<RenderContext>,

    /// One per channel, so each channel keeps its own history.
    delay_lines: Vec<DelayLine>,

    /// Shared by all channels. Odd channels read its quadrature output
    /// when `odd90` is on.
    lfo: Lfo,
}

/// Delay taps for one frame, in samples.
#[derive(Clone, Copy)]
struct Taps {
    /// Tap for channels 0, 2, 4, ... (from `Lfo::value`).
    even: f32,
    /// Tap for channels 1, 3, 5, ... Same as `even` unless `odd90` is on,
    /// in which case it comes from `Lfo::quad_phase_value`.
    odd: f32,
}

/// Gains applied while writing one frame. Resolved once per render call
/// (or per frame, for single-frame calls) so the channel loop is three
/// multiplies and an add.
#[derive(Clone, Copy)]
struct Mix {
    /// Signed feedback gain: negative when `negative_feedback` is on.
    feedback: f32,
    /// Gain on the delayed sample.
    wet: f32,
    /// Gain on the input sample.
    dry: f32,
}

impl Kernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a new render format. Every delay line is reallocated, so
    /// all previously buffered audio is dropped and the LFO restarts.
    ///
    /// This allocates and must never run concurrently with `render()`. On
    /// error the previous configuration is left untouched.
    pub fn configure(
        &mut self,
        channel_count: usize,
        sample_rate: f64,
        max_frames_per_block: usize,
        max_delay_milliseconds: f64,
    ) -> Result<(), ConfigureError> {
        if channel_count == 0 {
            return Err(ConfigureError::ZeroChannels);
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ConfigureError::InvalidSampleRate(sample_rate));
        }
        if !(max_delay_milliseconds.is_finite() && max_delay_milliseconds > 0.0) {
            return Err(ConfigureError::InvalidMaxDelay(max_delay_milliseconds));
        }
        if max_frames_per_block == 0 {
            return Err(ConfigureError::ZeroMaxFrames);
        }

        let capacity = DelayLine::capacity_for(max_delay_milliseconds, sample_rate);
        nih_log!(
            "configuring flanger: {channel_count} channel(s) at {sample_rate} Hz, \
             {max_delay_milliseconds} ms max delay ({capacity} samples per line)"
        );

        self.delay_lines = (0..channel_count).map(|_| DelayLine::new(capacity)).collect();

        self.lfo.set_waveform(LfoWaveform::Triangle);
        self.lfo.set_sample_rate(sample_rate as f32);

        self.context = Some(RenderContext {
            max_frames_per_block,
            max_delay_milliseconds: max_delay_milliseconds as f32,
            samples_per_millisecond: (sample_rate / 1000.0) as f32,
        });

        Ok(())
    }

    /// Silence every delay line. The LFO keeps its phase.
    pub fn reset(&mut self) {
        for delay_line in &mut self.delay_lines {
            delay_line.clear();
        }
    }

    /// How many frames of output remain after the input goes silent, for a
    /// feedback gain of `feedback`.
    ///
    /// One pass through the loop is at most one full delay line, and each
    /// pass scales the signal by `|feedback|`. The tail ends once that has
    /// decayed by 60 dB:
    ///
    /// ```text
    /// repeats = log10(0.001) / log10(|feedback|)
    /// ```
    pub fn tail_frames(&self, feedback: f32) -> u32 {
        let Some(loop_len) = self.delay_lines.first().map(DelayLine::capacity) else {
            return 0;
        };

        let feedback = feedback.abs();
        if feedback > 0.001 {
            let repeats = -3.0 / feedback.log10();
            (repeats * loop_len as f32) as u32
        } else {
            // No feedback: a single echo, at most one line long.
            loop_len as u32
        }
    }

    /// Render `frame_count` frames from `inputs` into `outputs`, one slice
    /// per channel.
    ///
    /// The switches are read once for the whole call. The smoothed controls
    /// are read per frame when `frame_count == 1`, and once from their
    /// block-final values otherwise.
    pub fn render<R, I, O>(
        &mut self,
        controls: &Controls<R>,
        inputs: &[I],
        outputs: &mut [O],
        frame_count: usize,
    ) where
        R: RampedParameter,
        I: AsRef<[f32]>,
        O: AsMut<[f32]>,
    {
        let Some(context) = self.context else {
            nih_debug_assert_failure!("render() called before configure()");
            return;
        };
        nih_debug_assert!(frame_count <= context.max_frames_per_block);
        nih_debug_assert!(inputs.len().min(outputs.len()) >= self.delay_lines.len());

        let odd90 = controls.odd90;
        let sign = if controls.negative_feedback { -1.0 } else { 1.0 };
        self.lfo.set_waveform(controls.waveform);

        if frame_count == 1 {
            self.lfo.set_frequency(controls.rate.frame_value());
            let (center, variance) = Self::center_variance(
                &context,
                controls.delay.frame_value(),
                controls.depth.frame_value(),
            );
            let taps = if odd90 {
                self.double_tap(&context, center, variance)
            } else {
                self.single_tap(&context, center, variance)
            };
            let mix = Mix {
                feedback: sign * controls.feedback.frame_value(),
                wet: controls.wet_mix.frame_value(),
                dry: controls.dry_mix.frame_value(),
            };
            self.write_frame(inputs, outputs, 0, taps, mix);
            return;
        }

        // One evaluation for the whole block. The LFO still moves per frame.
        self.lfo.set_frequency(controls.rate.final_value());
        let (center, variance) = Self::center_variance(
            &context,
            controls.delay.final_value(),
            controls.depth.final_value(),
        );
        let mix = Mix {
            feedback: sign * controls.feedback.final_value(),
            wet: controls.wet_mix.final_value(),
            dry: controls.dry_mix.final_value(),
        };

        // Branch once per block rather than once per frame.
        if odd90 {
            for frame in 0..frame_count {
                let taps = self.double_tap(&context, center, variance);
                self.write_frame(inputs, outputs, frame, taps, mix);
            }
        } else {
            for frame in 0..frame_count {
                let taps = self.single_tap(&context, center, variance);
                self.write_frame(inputs, outputs, frame, taps, mix);
            }
        }
    }

    #[inline]
    fn center_variance(context: &RenderContext, delay: f32, depth: f32) -> (f32, f32) {
        let variance = (context.max_delay_milliseconds - delay) * depth / 2.0;
        (delay + variance, variance)
    }

    #[inline]
    fn single_tap(&mut self, context: &RenderContext, center: f32, variance: f32) -> Taps {
        let tap = (center + self.lfo.value() * variance) * context.samples_per_millisecond;
        self.lfo.increment();
        Taps { even: tap, odd: tap }
    }

    #[inline]
    fn double_tap(&mut self, context: &RenderContext, center: f32, variance: f32) -> Taps {
        let spms = context.samples_per_millisecond;
        let even = (center + self.lfo.value() * variance) * spms;
        let odd = (center + self.lfo.quad_phase_value() * variance) * spms;
        self.lfo.increment();
        Taps { even, odd }
    }

    /// Read, feed back, write and mix one frame on every channel.
    #[inline]
    fn write_frame<I, O>(&mut self, inputs: &[I], outputs: &mut [O], frame: usize, taps: Taps, mix: Mix)
    where
        I: AsRef<[f32]>,
        O: AsMut<[f32]>,
    {
        let channels = self.delay_lines.iter_mut().zip(inputs).zip(outputs.iter_mut());
        for (channel, ((delay_line, input), output)) in channels.enumerate() {
            let tap = if channel & 1 == 1 { taps.odd } else { taps.even };
            let input = input.as_ref()[frame];

            let delayed = delay_line.read(tap);
            delay_line.write(input + mix.feedback * delayed);
            output.as_mut()[frame] = mix.wet * delayed + mix.dry * input;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
