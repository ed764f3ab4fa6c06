//! # Fractional Delay Line
//!
//! A flanger reads its input back a few milliseconds late, and that
//! "few milliseconds" changes every sample as the modulator sweeps. The
//! delay line is the tape loop that makes this possible: a fixed-size
//! ring of past samples with a write cursor that moves forward by one
//! slot per sample.
//!
//! ## Read offsets
//!
//! Offsets are measured back from the write cursor, the slot the *next*
//! `write()` will fill. The kernel reads before it writes each frame, so a
//! tap of `d` samples returns the input from exactly `d` frames ago:
//!
//! ```text
//! read(1.0)  → the sample written last
//! read(2.0)  → the one before it
//! read(2.25) → 75% of "2 back" blended with 25% of "3 back"
//! read(0.0)  → the slot about to be overwritten (the oldest sample)
//! ```
//!
//! The blend is plain linear interpolation between the two slots that
//! bracket the requested position:
//!
//! ```text
//! result = (1 - frac) * newer + frac * older
//! ```
//!
//! ## Sizing
//!
//! The ring never grows. It is allocated once, while the host is
//! configuring the plugin, with room for the longest delay the flanger can
//! ask for plus one slot so the interpolation partner always exists.

/// A ring buffer read at fractional offsets behind its write cursor.
///
/// Writing past the capacity silently overwrites the oldest sample. That
/// is the whole point of a ring, so it is not an error.
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Stored samples, initialised to silence.
    buffer: Vec<f32>,

    /// Slot the next `write()` lands in. Always `< buffer.len()`.
    write_pos: usize,
}

impl DelayLine {
    /// Create a silent delay line holding `capacity` samples.
    ///
    /// A zero capacity is bumped to one slot so the ring arithmetic below
    /// never divides by zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    /// Capacity needed to hold `max_delay_ms` of audio at `sample_rate`:
    /// `ceil(max_delay_ms * sample_rate / 1000) + 1`.
    pub fn capacity_for(max_delay_ms: f64, sample_rate: f64) -> usize {
        (max_delay_ms * sample_rate / 1000.0).ceil() as usize + 1
    }

    /// Number of samples the ring holds.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Append one sample and advance the write cursor, wrapping at the end
    /// of the ring.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Read `delay_samples` behind the write cursor, interpolating linearly
    /// between the two bracketing slots.
    ///
    /// The offset is clamped to `[0, capacity - 1]`. Upstream tap math can
    /// land a hair outside that range through rounding, and a clamp costs
    /// less than a bounds failure on the audio thread.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);

        let whole = delay as usize;
        let frac = delay - whole as f32;

        // Adding `len` keeps the subtraction non-negative for every
        // clamped offset.
        let newer = (self.write_pos + len - whole) % len;
        let older = if newer == 0 { len - 1 } else { newer - 1 };

        self.buffer[newer] * (1.0 - frac) + self.buffer[older] * frac
    }

    /// Return the ring to silence and rewind the write cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_formula() {
        // 20ms at 44.1kHz = 882 samples, plus the interpolation slot.
        assert_eq!(DelayLine::capacity_for(20.0, 44100.0), 883);
        // Fractional sample counts round up before the extra slot.
        assert_eq!(DelayLine::capacity_for(1.0, 44100.5), 46);
        assert_eq!(DelayLine::new(883).capacity(), 883);
    }

    #[test]
    fn test_one_sample_back_is_most_recent_write() {
        let mut dl = DelayLine::new(16);

        for i in 1..=5 {
            dl.write(i as f32);
            assert!(
                (dl.read(1.0) - i as f32).abs() < 1e-6,
                "read(1) should return the sample just written ({i})"
            );
        }
    }

    #[test]
    fn test_zero_offset_reads_the_slot_about_to_be_overwritten() {
        let mut dl = DelayLine::new(4);
        for i in 1..=4 {
            dl.write(i as f32);
        }

        // The ring is full, so the write cursor sits on the oldest sample.
        assert!((dl.read(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fifo_sequence() {
        let mut dl = DelayLine::new(10);

        for i in 1..=5 {
            dl.write(i as f32);
        }

        assert!((dl.read(1.0) - 5.0).abs() < 1e-6);
        assert!((dl.read(2.0) - 4.0).abs() < 1e-6);
        assert!((dl.read(3.0) - 3.0).abs() < 1e-6);
        assert!((dl.read(4.0) - 2.0).abs() < 1e-6);
        assert!((dl.read(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_interpolation() {
        let mut dl = DelayLine::new(100);

        dl.write(0.0);
        dl.write(1.0);

        // Halfway between the newest (1.0) and the one before (0.0).
        let result = dl.read(1.5);
        assert!((result - 0.5).abs() < 1e-6, "Expected 0.5, got {result}");

        // A quarter of the way back.
        let result = dl.read(1.25);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    #[test]
    fn test_wraparound_keeps_latest_samples() {
        let mut dl = DelayLine::new(4);

        // Six writes into four slots: 0 and 1 are gone, 2..=5 remain.
        for i in 0..6 {
            dl.write(i as f32);
        }

        assert!((dl.read(1.0) - 5.0).abs() < 1e-6);
        assert!((dl.read(2.0) - 4.0).abs() < 1e-6);
        assert!((dl.read(3.0) - 3.0).abs() < 1e-6);
        // The cursor slot still holds the oldest surviving sample.
        assert!((dl.read(0.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_interpolation_across_the_seam() {
        let mut dl = DelayLine::new(4);

        // After five writes the newest sample sits in slot 0 and the one
        // before it in slot 3, so reading 1.5 back blends the two.
        for i in 0..5 {
            dl.write(i as f32);
        }

        let result = dl.read(1.5);
        assert!((result - 3.5).abs() < 1e-6, "Expected 3.5, got {result}");
    }

    #[test]
    fn test_offsets_are_clamped() {
        let mut dl = DelayLine::new(4);
        for i in 0..4 {
            dl.write(i as f32);
        }

        // Past the end clamps to capacity - 1 = 3 back.
        assert!((dl.read(100.0) - 1.0).abs() < 1e-6);
        assert!((dl.read(3.0) - 1.0).abs() < 1e-6);
        // Negative offsets clamp to the cursor slot.
        assert!((dl.read(-2.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_clear() {
        let mut dl = DelayLine::new(10);

        dl.write(0.5);
        dl.write(0.25);
        dl.clear();

        for delay in [0.0, 1.0, 4.5, 9.0] {
            let result = dl.read(delay);
            assert!(result.abs() < 1e-6, "Expected silence after clear, got {result}");
        }
    }

    #[test]
    fn test_zero_capacity_is_usable() {
        let mut dl = DelayLine::new(0);
        assert_eq!(dl.capacity(), 1);

        dl.write(0.3);
        assert!((dl.read(0.0) - 0.3).abs() < 1e-6);
    }
}
