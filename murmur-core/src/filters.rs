//! Filters: the one-pole low-pass every noise texture is built from.
//!
//! `OnePoleLP` uses the inexpensive `y += α (x − y)` form. Noise generators
//! usually think in terms of the raw `α` (0.008 for a slow rumble, 0.2 for a
//! hiss), so the filter can be built either from `α` directly or from a cutoff.
//! For a cutoff `fc`, `α = 1 − exp(−2π fc / sr)`.

use crate::dsp::{clamp, kill_denormals, one_pole_alpha_hz};

/// One-pole low-pass `y += α (x − y)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OnePoleLP {
    a: f32,
    y: f32,
}

impl OnePoleLP {
    /// Create a low-pass with cutoff `cut_hz` and sample rate `sr`.
    #[inline]
    pub fn new(cut_hz: f32, sr: f32) -> Self {
        Self::with_alpha(one_pole_alpha_hz(cut_hz, sr))
    }

    /// Create a low-pass from a raw smoothing factor, clamped into [0, 1].
    #[inline]
    pub fn with_alpha(alpha: f32) -> Self {
        Self { a: clamp(alpha, 0.0, 1.0), y: 0.0 }
    }

    #[inline]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.a = clamp(alpha, 0.0, 1.0);
    }

    #[inline]
    pub fn set_cutoff_hz(&mut self, cut_hz: f32, sr: f32) {
        self.a = one_pole_alpha_hz(cut_hz, sr);
    }

    #[inline] pub fn alpha(&self) -> f32 { self.a }

    /// Zero the accumulator.
    #[inline]
    pub fn reset(&mut self) { self.y = 0.0; }

    /// Preload the accumulator, e.g. to start a slow modulator mid-range.
    #[inline]
    pub fn reset_to(&mut self, y0: f32) { self.y = y0; }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.y += self.a * (x - self.y);
        self.y = kill_denormals(self.y);
        self.y
    }

    #[inline] pub fn value(&self) -> f32 { self.y }
}

// ------------------------------------ Tests --------------------------------------
