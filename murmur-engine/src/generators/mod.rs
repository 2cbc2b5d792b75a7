//! Noise generators and the per-source state bank.
//!
//! Each generator is a small struct that owns exactly the filter, timer and
//! phase state it needs and advances it by one frame per `next` call. The
//! generators never share state; the [`GeneratorBank`] owns one instance of
//! each and is itself owned by a single [`Renderer`](crate::render::Renderer).
//!
//! Every generator hard-clamps its output to [`OUTPUT_LIMIT`], so stacking
//! layers cannot produce runaway values regardless of what the RNG does.

mod birds;
mod brown;
mod fire;
mod rain;
mod white;

pub use birds::Birdsong;
pub use brown::BrownNoise;
pub use fire::FireCrackle;
pub use rain::Rainfall;
pub use white::WhiteNoise;

use rand::Rng;

use crate::source::SoundKind;

/// Per-sample output bound of every generator.
pub const OUTPUT_LIMIT: f32 = 0.9;

/// Anything that can produce one noise sample at a time.
pub trait Generator {
    /// Drop all accumulated state, as if freshly constructed for `sr`.
    fn reset(&mut self, sr: f32);

    /// Advance one frame. Output lies within `[-OUTPUT_LIMIT, OUTPUT_LIMIT]`.
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32;
}

#[inline]
pub(crate) fn bipolar<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}

#[inline]
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    rng.gen::<f32>() < p
}

/// Frames of linear attack so one-shot events never start with a step.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn attack(elapsed: u32, frames: u32) -> f32 {
    if elapsed >= frames { 1.0 } else { elapsed as f32 / frames as f32 }
}

/// The state of every generator, indexed by [`SoundKind`].
#[derive(Clone, Debug)]
pub struct GeneratorBank {
    sr: f32,
    white: WhiteNoise,
    brown: BrownNoise,
    fire: FireCrackle,
    rain: Rainfall,
    birds: Birdsong,
}

impl GeneratorBank {
    pub fn new(sr: f32) -> Self {
        let sr = sr.max(1.0);
        Self {
            sr,
            white: WhiteNoise,
            brown: BrownNoise::new(),
            fire: FireCrackle::new(),
            rain: Rainfall::new(),
            birds: Birdsong::new(sr),
        }
    }

    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Zero the state of one source.
    pub fn reset(&mut self, kind: SoundKind) {
        let sr = self.sr;
        match kind {
            SoundKind::White => self.white.reset(sr),
            SoundKind::Brown => self.brown.reset(sr),
            SoundKind::Fire => self.fire.reset(sr),
            SoundKind::Rain => self.rain.reset(sr),
            SoundKind::Birds => self.birds.reset(sr),
        }
    }

    pub fn reset_all(&mut self) {
        for kind in SoundKind::ALL {
            self.reset(kind);
        }
    }

    /// Advance one source by one frame.
    #[inline]
    pub fn next<R: Rng + ?Sized>(&mut self, kind: SoundKind, rng: &mut R) -> f32 {
        match kind {
            SoundKind::White => self.white.next(rng),
            SoundKind::Brown => self.brown.next(rng),
            SoundKind::Fire => self.fire.next(rng),
            SoundKind::Rain => self.rain.next(rng),
            SoundKind::Birds => self.birds.next(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::XorShift32;
    use rand::SeedableRng;

    const SR: f32 = 44_100.0;

    fn run(bank: &mut GeneratorBank, kind: SoundKind, seed: u64, n: usize) -> Vec<f32> {
        let mut rng = XorShift32::seed_from_u64(seed);
        (0..n).map(|_| bank.next(kind, &mut rng)).collect()
    }

    fn mean(xs: &[f32]) -> f64 {
        xs.iter().map(|&x| f64::from(x)).sum::<f64>() / xs.len() as f64
    }

    /// Mean squared first difference over variance: ~2 for white, small for
    /// low-passed noise.
    fn hf_ratio(xs: &[f32]) -> f64 {
        let m = mean(xs);
        let var = xs.iter().map(|&x| (f64::from(x) - m).powi(2)).sum::<f64>() / xs.len() as f64;
        let diff = xs
            .windows(2)
            .map(|w| f64::from(w[1] - w[0]).powi(2))
            .sum::<f64>()
            / (xs.len() - 1) as f64;
        diff / var
    }

    #[test]
    fn every_generator_is_bounded() {
        let mut bank = GeneratorBank::new(SR);
        for kind in SoundKind::ALL {
            for (i, x) in run(&mut bank, kind, 9, 200_000).into_iter().enumerate() {
                assert!(x.is_finite(), "{kind:?} produced {x} at {i}");
                assert!(x.abs() <= OUTPUT_LIMIT, "{kind:?} produced {x} at {i}");
            }
        }
    }

    #[test]
    fn white_noise_is_centered_and_uncorrelated() {
        let mut bank = GeneratorBank::new(SR);
        let xs = run(&mut bank, SoundKind::White, 1, 200_000);
        assert!(xs.iter().all(|x| (-0.5..=0.5).contains(x)));
        let m = mean(&xs);
        assert!(m.abs() < 0.01, "mean={m}");

        let var = xs.iter().map(|&x| (f64::from(x) - m).powi(2)).sum::<f64>();
        let cov = xs
            .windows(2)
            .map(|w| (f64::from(w[0]) - m) * (f64::from(w[1]) - m))
            .sum::<f64>();
        let lag1 = cov / var;
        // 200k samples: sampling noise on the estimate is ~0.002
        assert!(lag1.abs() < 0.01, "lag-1 autocorrelation {lag1}");
    }

    #[test]
    fn brown_noise_has_less_high_frequency_energy() {
        let mut bank = GeneratorBank::new(SR);
        let white = run(&mut bank, SoundKind::White, 2, 100_000);
        let brown = run(&mut bank, SoundKind::Brown, 2, 100_000);
        let (w, b) = (hf_ratio(&white), hf_ratio(&brown));
        assert!(w > 1.8, "white ratio {w}");
        assert!(b < 0.5 * w, "brown ratio {b} vs white {w}");
    }

    #[test]
    fn reset_matches_fresh_instance() {
        for kind in SoundKind::ALL {
            let mut used = GeneratorBank::new(SR);
            run(&mut used, kind, 77, 50_000);
            used.reset(kind);
            let after_reset = run(&mut used, kind, 5, 20_000);

            let mut fresh = GeneratorBank::new(SR);
            let from_fresh = run(&mut fresh, kind, 5, 20_000);
            assert_eq!(after_reset, from_fresh, "{kind:?} leaked state across reset");
        }
    }

    #[test]
    fn resetting_one_source_leaves_others_alone() {
        let mut bank = GeneratorBank::new(SR);
        run(&mut bank, SoundKind::Brown, 3, 1000);
        let before = bank.brown.clone();
        bank.reset(SoundKind::Fire);
        assert_eq!(bank.brown, before);
    }

    #[test]
    fn ambient_textures_are_audible() {
        let mut bank = GeneratorBank::new(SR);
        for kind in [SoundKind::Fire, SoundKind::Rain, SoundKind::Birds] {
            let xs = run(&mut bank, kind, 21, 441_000);
            let peak = xs.iter().fold(0.0f32, |p, x| p.max(x.abs()));
            assert!(peak > 0.01, "{kind:?} stayed silent (peak {peak})");
        }
    }
}
