//! Envelopes and parameter slewing primitives.
//!
//! Provided:
//! - `SlewLimiter` : one-pole slew/smoother for layer gains and volume
//! - `Transient`   : one-shot decaying event (pops, droplets, chirps)
//! - `LinearRamp`  : bounded linear fade with snap and exactly-once completion
//!
//! All of these are `no_std` friendly and avoid heap allocations.

use crate::dsp::{abs, clamp, one_pole_coeff_ms};

/// Below this distance a fade is not worth running; the ramp snaps instead.
pub const DEFAULT_SNAP_EPSILON: f32 = 0.01;

// -------------------------------- Slew Limiter -----------------------------------

/// One-pole slew/smoother: `y += (x - y) * (1 - a)`
///
/// Use `alpha = one_pole_coeff_ms(t_ms, sr)`.
#[derive(Copy, Clone, Debug)]
pub struct SlewLimiter {
    alpha: f32,
    y:     f32,
}

impl SlewLimiter {
    #[inline]
    pub fn new(t_ms: f32, sr: f32) -> Self {
        Self { alpha: one_pole_coeff_ms(t_ms, sr), y: 0.0 }
    }

    #[inline]
    pub fn set_time_ms(&mut self, t_ms: f32, sr: f32) {
        self.alpha = one_pole_coeff_ms(t_ms, sr);
    }

    #[inline]
    pub fn reset(&mut self, y0: f32) { self.y = y0; }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let next = self.y + (x - self.y) * (1.0 - self.alpha);
        // a step below half an ulp leaves `y` stuck short of the target
        self.y = if next == self.y || abs(x - next) < 1e-6 { x } else { next };
        self.y
    }

    #[inline]
    pub fn value(&self) -> f32 { self.y }
}

// -------------------------------- Transients -------------------------------------

/// How a transient decays over its lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecayShape {
    /// `intensity × decay`: softer tail.
    Linear,
    /// `intensity × decay²`: sharper snap.
    Quadratic,
}

/// A one-shot event that lasts a fixed number of frames and decays to zero.
///
/// `decay = remaining / duration`, so the first frame after `trigger` is the
/// loudest and the last one is the quietest non-zero value.
#[derive(Copy, Clone, Debug)]
pub struct Transient {
    remaining: u32,
    duration:  u32,
    intensity: f32,
    shape:     DecayShape,
}

impl Transient {
    #[inline]
    pub const fn new(shape: DecayShape) -> Self {
        Self { remaining: 0, duration: 1, intensity: 0.0, shape }
    }

    /// Restart the event. Zero-length events last one frame.
    #[inline]
    pub fn trigger(&mut self, frames: u32, intensity: f32) {
        self.duration = frames.max(1);
        self.remaining = self.duration;
        self.intensity = intensity;
    }

    #[inline] pub fn is_active(&self) -> bool { self.remaining > 0 }

    #[inline] pub fn remaining(&self) -> u32 { self.remaining }

    /// Frames played since the last trigger.
    #[inline] pub fn elapsed(&self) -> u32 { self.duration - self.remaining }

    /// Elapsed fraction of the event in [0, 1].
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        1.0 - self.remaining as f32 / self.duration as f32
    }

    /// Advance one frame and return the envelope value.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn next(&mut self) -> f32 {
        if self.remaining == 0 {
            return 0.0;
        }
        let decay = self.remaining as f32 / self.duration as f32;
        self.remaining -= 1;
        match self.shape {
            DecayShape::Linear => self.intensity * decay,
            DecayShape::Quadratic => self.intensity * decay * decay,
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.remaining = 0;
        self.duration = 1;
        self.intensity = 0.0;
    }
}

// -------------------------------- Linear ramp ------------------------------------

/// One step of a [`LinearRamp`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RampTick {
    pub value: f32,
    /// True on exactly one tick: the one that reached (or crossed) the target.
    pub finished: bool,
}

/// Linear fade between gains in [0, 1].
///
/// Retargeting replaces whatever fade was running and always starts from the
/// current value, so an interrupted fade-in turns into a fade-out from the
/// level it had reached.
#[derive(Copy, Clone, Debug)]
pub struct LinearRamp {
    value:  f32,
    target: f32,
    step:   f32,
    active: bool,
    eps:    f32,
}

impl LinearRamp {
    #[inline]
    pub fn new(value: f32) -> Self {
        let value = clamp(value, 0.0, 1.0);
        Self { value, target: value, step: 0.0, active: false, eps: DEFAULT_SNAP_EPSILON }
    }

    #[inline]
    #[must_use]
    pub fn with_epsilon(mut self, eps: f32) -> Self {
        self.eps = eps.max(0.0);
        self
    }

    /// Start a fade towards `target` over `steps` ticks.
    ///
    /// Returns `true` when no fade is needed (the distance is below the snap
    /// epsilon, or `steps == 0`); the value is then already at `target`.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn retarget(&mut self, target: f32, steps: u32) -> bool {
        let target = clamp(target, 0.0, 1.0);
        self.target = target;
        if steps == 0 || abs(target - self.value) < self.eps {
            self.value = target;
            self.step = 0.0;
            self.active = false;
            return true;
        }
        self.step = (target - self.value) / steps as f32;
        self.active = true;
        false
    }

    /// Advance one tick.
    #[inline]
    pub fn next(&mut self) -> RampTick {
        if !self.active {
            return RampTick { value: self.value, finished: false };
        }
        let v = clamp(self.value + self.step, 0.0, 1.0);
        let reached = if self.step > 0.0 { v >= self.target } else { v <= self.target };
        if reached {
            self.value = self.target;
            self.active = false;
            RampTick { value: self.value, finished: true }
        } else {
            self.value = v;
            RampTick { value: v, finished: false }
        }
    }

    #[inline] pub fn value(&self) -> f32 { self.value }
    #[inline] pub fn target(&self) -> f32 { self.target }
    #[inline] pub fn is_active(&self) -> bool { self.active }
}

// ------------------------------------ Tests --------------------------------------
