use rand::Rng;

use super::Generator;

/// Uniform white noise in [-0.5, 0.5). Stateless.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WhiteNoise;

impl Generator for WhiteNoise {
    #[inline]
    fn reset(&mut self, _sr: f32) {}

    #[inline]
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        rng.gen::<f32>() - 0.5
    }
}
