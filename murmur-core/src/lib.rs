#![cfg_attr(not(feature = "std"), no_std)]
//! murmur core: no_std-ready DSP primitives for procedural noise textures.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm`/`micromath` math backends
//! - `fast-math`: polynomial sine for the tone oscillators
//!
//! Modules
//! - [`dsp`]       : math backend, clamps, smoothing coefficients, fast sine, meters
//! - [`envelopes`] : slew limiter, one-shot transients, the linear fade ramp
//! - [`filters`]   : one-pole low-pass in the `y += α(x − y)` form
//!
//! Everything here is allocation free and safe to call from a render callback.

pub mod dsp;
pub mod envelopes;
pub mod filters;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{
        block_rms, clamp, fast_sin, hard_clip, kill_denormals, lerp, one_pole_coeff_ms, sin01,
        Rms, TAU,
    };
    pub use crate::envelopes::{DecayShape, LinearRamp, RampTick, SlewLimiter, Transient};
    pub use crate::filters::OnePoleLP;
}
