//! Engine tuning.
//!
//! Plain data with builder-style setters. Everything is in milliseconds or
//! linear gain; frame counts are derived once the output sample rate is known.

use murmur_core::dsp::{clamp, ms_to_frames};
use murmur_core::envelopes::DEFAULT_SNAP_EPSILON;

use crate::source::SourcePolicy;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Session start: output gain 0 → 1.
    pub fade_in_ms: f32,
    /// Session stop: current gain → 0.
    pub fade_out_ms: f32,
    /// Each half of a cross-family switch.
    pub switch_fade_ms: f32,
    /// Blend time of a single layer entering or leaving the mix.
    pub layer_fade_ms: f32,
    pub volume_smoothing_ms: f32,
    /// Fades shorter than this distance snap.
    pub fade_epsilon: f32,
    /// Applied after the mix clamp.
    pub final_gain: f32,
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
    pub policy: SourcePolicy,
    /// How long `poll` waits for any fade to be rendered before tearing the
    /// device down anyway. Keep it above the longest fade.
    pub teardown_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 250.0,
            fade_out_ms: 300.0,
            switch_fade_ms: 120.0,
            layer_fade_ms: 40.0,
            volume_smoothing_ms: 30.0,
            fade_epsilon: DEFAULT_SNAP_EPSILON,
            final_gain: 0.8,
            seed: None,
            policy: SourcePolicy::synthesized(),
            teardown_timeout_ms: 2_000,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_fade_in_ms(mut self, ms: f32) -> Self {
        self.fade_in_ms = ms;
        self
    }

    #[must_use]
    pub fn with_fade_out_ms(mut self, ms: f32) -> Self {
        self.fade_out_ms = ms;
        self
    }

    #[must_use]
    pub fn with_switch_fade_ms(mut self, ms: f32) -> Self {
        self.switch_fade_ms = ms;
        self
    }

    #[must_use]
    pub fn with_layer_fade_ms(mut self, ms: f32) -> Self {
        self.layer_fade_ms = ms;
        self
    }

    #[must_use]
    pub fn with_volume_smoothing_ms(mut self, ms: f32) -> Self {
        self.volume_smoothing_ms = ms;
        self
    }

    #[must_use]
    pub fn with_fade_epsilon(mut self, eps: f32) -> Self {
        self.fade_epsilon = eps;
        self
    }

    #[must_use]
    pub fn with_final_gain(mut self, gain: f32) -> Self {
        self.final_gain = gain;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_teardown_timeout_ms(mut self, ms: u64) -> Self {
        self.teardown_timeout_ms = ms;
        self
    }

    /// Clamp every field into a range the engine can work with. NaNs fall
    /// back to the defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let ms = |v: f32, fallback: f32| if v.is_finite() { clamp(v, 0.0, 10_000.0) } else { fallback };
        Self {
            fade_in_ms: ms(self.fade_in_ms, d.fade_in_ms),
            fade_out_ms: ms(self.fade_out_ms, d.fade_out_ms),
            switch_fade_ms: ms(self.switch_fade_ms, d.switch_fade_ms),
            layer_fade_ms: ms(self.layer_fade_ms, d.layer_fade_ms),
            volume_smoothing_ms: ms(self.volume_smoothing_ms, d.volume_smoothing_ms),
            fade_epsilon: if self.fade_epsilon.is_finite() {
                clamp(self.fade_epsilon, 0.0, 0.5)
            } else {
                d.fade_epsilon
            },
            final_gain: if self.final_gain.is_finite() {
                clamp(self.final_gain, 0.0, 1.0)
            } else {
                d.final_gain
            },
            ..self
        }
    }

    /// Frame length of a fade of `ms`; zero means "snap".
    #[inline]
    pub fn fade_frames(ms: f32, sr: f32) -> u32 {
        if ms <= 0.0 { 0 } else { ms_to_frames(ms, sr) }
    }
}
