use murmur_core::dsp::hard_clip;
use murmur_core::filters::OnePoleLP;
use rand::Rng;

use super::{Generator, OUTPUT_LIMIT};

/// Smoothing factor of the integrating low-pass.
const ALPHA: f32 = 0.1;

/// Restores some of the amplitude the low-pass takes away.
const MAKEUP_GAIN: f32 = 1.6;

/// White noise through a one-pole low-pass: `filter += α (white − filter)`.
///
/// The accumulator carries over between buffers; it is only cleared by
/// [`Generator::reset`], which the mixer calls when brown noise is (re)selected.
#[derive(Clone, Debug, PartialEq)]
pub struct BrownNoise {
    filter: OnePoleLP,
}

impl BrownNoise {
    pub fn new() -> Self {
        Self { filter: OnePoleLP::with_alpha(ALPHA) }
    }
}

impl Default for BrownNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for BrownNoise {
    #[inline]
    fn reset(&mut self, _sr: f32) {
        self.filter.reset();
    }

    #[inline]
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let white = rng.gen::<f32>() - 0.5;
        hard_clip(self.filter.process(white) * MAKEUP_GAIN, OUTPUT_LIMIT)
    }
}
