//! Building blocks (nodes) shared by the noise generators.
//!
//! These are zero-allocation, per-sample components designed for realtime use.
//! Everything here is `Copy` and cheap to move; no locks, no heap.
//!
//! Contents:
//! - `Osc`        : sine phase accumulator with optional per-sample pitch ratio
//! - `RandomWalk` : bounded, slewed random drift, nudged every N frames
//!
//! Randomness is always injected by the caller so generator output stays
//! reproducible under a seeded RNG.

use murmur_core::dsp::{advance_phase, clamp, sin01};
use murmur_core::filters::OnePoleLP;
use rand::Rng;

/// Free-running sine oscillator.
#[derive(Copy, Clone, Debug, Default)]
pub struct Osc {
    phase: f32, // [0,1)
    inc:   f32, // cycles per sample
}

impl Osc {
    #[inline] pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn set_freq(&mut self, hz: f32, sr: f32) {
        self.inc = hz.max(0.0) / sr.max(1.0);
    }

    /// Advance one sample and return the sine value.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.next_with_ratio(1.0)
    }

    /// Advance one sample at `ratio` times the set frequency.
    #[inline]
    pub fn next_with_ratio(&mut self, ratio: f32) -> f32 {
        let s = sin01(self.phase);
        self.phase = advance_phase(self.phase, self.inc * ratio);
        s
    }

    #[inline]
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.inc = 0.0;
    }
}

/// Slowly changing random modulator.
///
/// Every `period` frames the target moves by a random amount within
/// `±step`, clamped to `[low, high]`; the output slews towards it through a
/// one-pole low-pass, so it never jumps.
#[derive(Copy, Clone, Debug)]
pub struct RandomWalk {
    low: f32,
    high: f32,
    step: f32,
    initial: f32,
    period: u32,
    countdown: u32,
    target: f32,
    lp: OnePoleLP,
}

impl RandomWalk {
    /// `alpha` is the slew factor of the smoothing low-pass (smaller = slower).
    pub fn new(low: f32, high: f32, initial: f32, step: f32, period: u32, alpha: f32) -> Self {
        let initial = clamp(initial, low, high);
        let mut lp = OnePoleLP::with_alpha(alpha);
        lp.reset_to(initial);
        Self {
            low,
            high,
            step: step.abs(),
            initial,
            period: period.max(1),
            countdown: period.max(1),
            target: initial,
            lp,
        }
    }

    /// Back to the initial value with a fresh countdown.
    #[inline]
    pub fn reset(&mut self) {
        self.target = self.initial;
        self.countdown = self.period;
        self.lp.reset_to(self.initial);
    }

    /// Next value, updated once per sample. Always within `[low, high]`.
    #[inline]
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.period;
            let nudge = (rng.gen::<f32>() * 2.0 - 1.0) * self.step;
            self.target = clamp(self.target + nudge, self.low, self.high);
        }
        clamp(self.lp.process(self.target), self.low, self.high)
    }

    #[inline] pub fn value(&self) -> f32 { self.lp.value() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::XorShift32;

    #[test]
    fn osc_is_periodic() {
        let mut osc = Osc::new();
        osc.set_freq(1000.0, 48000.0);
        let first = osc.next();
        for _ in 0..47 { osc.next(); }
        assert!((osc.next() - first).abs() < 1e-3);
    }

    #[test]
    fn random_walk_stays_in_bounds() {
        let mut rng = XorShift32::new(3);
        let mut walk = RandomWalk::new(0.3, 1.0, 0.7, 0.2, 50, 0.01);
        for _ in 0..200_000 {
            let v = walk.next(&mut rng);
            assert!((0.3..=1.0).contains(&v), "v={v}");
        }
    }

    #[test]
    fn random_walk_actually_moves() {
        let mut rng = XorShift32::new(11);
        let mut walk = RandomWalk::new(0.3, 1.0, 0.7, 0.2, 50, 0.01);
        let (mut lo, mut hi) = (1.0f32, 0.0f32);
        for _ in 0..100_000 {
            let v = walk.next(&mut rng);
            lo = lo.min(v);
            hi = hi.max(v);
        }
        assert!(hi - lo > 0.1, "lo={lo} hi={hi}");
    }

    #[test]
    fn reset_restores_initial_value() {
        let mut rng = XorShift32::new(5);
        let mut walk = RandomWalk::new(0.3, 1.0, 0.7, 0.2, 10, 0.5);
        for _ in 0..1000 { walk.next(&mut rng); }
        walk.reset();
        assert_eq!(walk.value(), 0.7);
    }
}
