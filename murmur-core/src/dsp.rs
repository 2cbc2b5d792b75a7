//! Generic DSP utilities and math helpers.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximation for the tone oscillators
//! - Side-effect free helpers that are easy to test
//!
//! Conventions:
//! - All functions are `#[inline]` where useful to help the optimizer.
//! - Argument and return domains are documented per function.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] fn m_abs(x: f32) -> f32 { x.abs() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] fn m_sqrt(x: f32) -> f32 { libm::sqrtf(x) }
        #[inline] fn m_abs(x: f32) -> f32 { libm::fabsf(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] fn m_abs(x: f32) -> f32 { x.abs() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (commonly useful)
pub const TAU: f32 = 2.0 * PI;

/// A very small epsilon used in denormal handling and safe divisions.
pub const EPS_SMALL: f32 = 1.0e-20;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

/// Symmetric hard clip into `[-limit, limit]`.
///
/// NaN maps to 0.0 so a degenerate filter state can never reach the device.
#[inline]
pub fn hard_clip(x: f32, limit: f32) -> f32 {
    if x.is_nan() { 0.0 } else { clamp(x, -limit, limit) }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn abs(x: f32) -> f32 {
    m_abs(x)
}

/// Kill denormal/subnormal values. Returns 0.0 if |x| < EPS_SMALL.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if m_abs(x) < EPS_SMALL { 0.0 } else { x }
}

// --------------------------------- Fast trig -------------------------------------

/// Sine of `x` (radians).
///
/// With `fast-math` this range-reduces into [-π, π], folds into [-π/2, π/2]
/// through `sin(π − x)` and evaluates a 5th-order odd polynomial (max abs
/// error ~2e-4); otherwise it calls the selected backend.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            const HALF_PI: f32 = core::f32::consts::FRAC_PI_2;
            let mut xr = x;
            // round-half-away via truncation keeps this usable without a `round` intrinsic
            let q = xr / TAU;
            let k = if q >= 0.0 { (q + 0.5) as i32 } else { (q - 0.5) as i32 };
            xr -= k as f32 * TAU;

            // the polynomial only holds on the half period around zero
            if xr > HALF_PI {
                xr = PI - xr;
            } else if xr < -HALF_PI {
                xr = -PI - xr;
            }

            // sin(x) ≈ x * (1 + b x^2 + c x^4)
            let x2 = xr * xr;
            xr * (1.0 + x2 * (-0.166_05 + x2 * 0.007_617))
        } else {
            m_sin(x)
        }
    }
}

/// Sine of a normalized phase in [0, 1).
#[inline]
pub fn sin01(phase01: f32) -> f32 {
    fast_sin(TAU * phase01)
}

/// Advance a normalized phase by `inc` cycles and wrap into [0, 1).
#[inline]
pub fn advance_phase(phase01: f32, inc: f32) -> f32 {
    let p = phase01 + inc;
    if p >= 1.0 { p - (p as i32) as f32 } else if p < 0.0 { 0.0 } else { p }
}

// --------------------------------- Exponentials / smoothing ----------------------

/// One-pole smoothing coefficient for a time constant `t_ms` (milliseconds).
///
/// The discrete one-pole form: `y[n] += (1 - a) * (x[n] - y[n])`
/// where `a = exp(-1/(tau * sr))` for first-order lag with time constant `tau`.
///
/// We interpret `t_ms` as the time to reach ~63% (1 - 1/e). Common for parameter smoothing.
#[inline]
pub fn one_pole_coeff_ms(t_ms: f32, sr: f32) -> f32 {
    if t_ms <= 0.0 { return 0.0; }
    let tau = t_ms * 0.001;
    m_exp(-1.0 / (tau * sr.max(1.0)))
}

/// Convert cutoff in Hz to the `α` of the `y += α (x − y)` one-pole form.
#[inline]
pub fn one_pole_alpha_hz(cut_hz: f32, sr: f32) -> f32 {
    let sr = sr.max(1.0);
    let fc = clamp(cut_hz, 0.0, 0.499 * sr);
    1.0 - m_exp(-2.0 * PI * fc / sr)
}

/// Number of frames covering `ms` milliseconds at `sr`, never less than one.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ms_to_frames(ms: f32, sr: f32) -> u32 {
    let frames = ms.max(0.0) * sr.max(1.0) / 1000.0;
    (frames as u32).max(1)
}

// --------------------------------- Simple meters ---------------------------------

/// Running RMS meter (windowed via exponential smoothing). Call once per sample.
///
/// `alpha` is the smoothing factor in [0,1]; a good choice is `1 - one_pole_coeff_ms(50, sr)`.
#[derive(Copy, Clone, Debug)]
pub struct Rms {
    pub alpha: f32,
    state: f32,
}
impl Rms {
    #[inline]
    pub fn new(alpha: f32) -> Self { Self { alpha, state: 0.0 } }

    #[inline]
    pub fn reset(&mut self) { self.state = 0.0; }

    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let x2 = x * x;
        self.state += self.alpha * (x2 - self.state);
        m_sqrt(self.state)
    }

    #[inline]
    pub fn value(&self) -> f32 { m_sqrt(self.state) }
}

/// RMS of a whole block. Returns 0.0 for an empty block.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub fn block_rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let sum: f32 = block.iter().map(|x| x * x).sum();
    m_sqrt(sum / block.len() as f32)
}

// --------------------------------- Tests (std only) ------------------------------
