//! Mixer: base + overlays with per-layer blending and loudness compensation.
//!
//! Every [`SoundKind`] has a layer. A layer is *live* while it is selected or
//! still fading out; only live layers advance their generator, so idle
//! sources cost nothing. When a deselected layer has faded to silence its
//! generator state is reset, which means a source selected again later always
//! starts from zeroed filters and timers.

use murmur_core::dsp::hard_clip;
use murmur_core::envelopes::SlewLimiter;
use rand::Rng;

use crate::generators::{GeneratorBank, OUTPUT_LIMIT};
use crate::source::{MixConfiguration, SoundKind, SoundSource, SourcePolicy};

/// Layer gain below which a deselected layer is considered gone.
const SILENCE: f32 = 1.0e-4;

/// Perceptual loudness normalisation for stacked overlays.
const COMPENSATION: f32 = 0.7;

#[derive(Copy, Clone, Debug)]
struct Layer {
    source: SoundSource,
    gain: SlewLimiter,
    target: f32,
    live: bool,
}

/// Gain multiplier for `overlays` simultaneously active synthesized overlays.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub fn compensation(overlays: usize) -> f32 {
    if overlays > 1 { COMPENSATION / overlays as f32 } else { 1.0 }
}

#[derive(Clone, Debug)]
pub struct Mixer {
    layers: [Layer; SoundKind::COUNT],
    comp: SlewLimiter,
    comp_target: f32,
    final_gain: f32,
    mix: MixConfiguration,
}

impl Mixer {
    /// Mixer already playing `mix` at full layer gain.
    ///
    /// Kinds that `policy` leaves to a loop player never get a live layer.
    /// `bank` is expected to be freshly constructed (or reset).
    pub fn new(
        mix: MixConfiguration,
        policy: SourcePolicy,
        sr: f32,
        layer_fade_ms: f32,
        final_gain: f32,
    ) -> Self {
        let layers = SoundKind::ALL.map(|kind| {
            let source = policy.source(kind);
            let mut gain = SlewLimiter::new(layer_fade_ms, sr);
            let on = source.is_generated && mix.contains(kind);
            let level = if on { 1.0 } else { 0.0 };
            gain.reset(level);
            Layer { source, gain, target: level, live: on }
        });
        let comp_target = compensation(mix.overlay_count());
        let mut comp = SlewLimiter::new(layer_fade_ms, sr);
        comp.reset(comp_target);
        Self { layers, comp, comp_target, final_gain, mix }
    }

    #[inline] pub fn mix(&self) -> MixConfiguration { self.mix }

    /// Current blend gain of one layer.
    #[inline]
    pub fn layer_gain(&self, kind: SoundKind) -> f32 {
        self.layers[kind.index()].gain.value()
    }

    /// Whether the layer's generator is being advanced.
    #[inline]
    pub fn is_live(&self, kind: SoundKind) -> bool {
        self.layers[kind.index()].live
    }

    /// Switch to a new configuration between frames.
    ///
    /// Layers entering the mix start from a reset generator at zero gain and
    /// blend in; layers leaving it blend out. A layer that is reselected
    /// while still fading out simply turns around.
    pub fn apply(&mut self, mix: MixConfiguration, bank: &mut GeneratorBank) {
        if mix == self.mix {
            return;
        }
        for kind in SoundKind::ALL {
            let layer = &mut self.layers[kind.index()];
            if layer.source.is_generated && mix.contains(kind) {
                if !layer.live {
                    bank.reset(kind);
                    layer.gain.reset(0.0);
                    layer.live = true;
                }
                layer.target = 1.0;
            } else {
                layer.target = 0.0;
            }
        }
        self.comp_target = compensation(mix.overlay_count());
        self.mix = mix;
    }

    /// Produce one mixed sample, advancing every live generator once.
    #[inline]
    pub fn next<R: Rng + ?Sized>(&mut self, bank: &mut GeneratorBank, rng: &mut R) -> f32 {
        let mut sum = 0.0;
        for kind in SoundKind::ALL {
            let layer = &mut self.layers[kind.index()];
            if !layer.live {
                continue;
            }
            let g = layer.gain.process(layer.target);
            sum += bank.next(kind, rng) * layer.source.base_gain * g;
            if layer.target == 0.0 && g < SILENCE {
                layer.gain.reset(0.0);
                layer.live = false;
                bank.reset(kind);
            }
        }
        let comp = self.comp.process(self.comp_target);
        let y = hard_clip(sum, OUTPUT_LIMIT) * self.final_gain * comp;
        debug_assert!(y.is_finite(), "mixer produced {y}");
        y
    }
}
