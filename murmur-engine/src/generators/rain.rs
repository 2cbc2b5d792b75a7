use murmur_core::dsp::hard_clip;
use murmur_core::envelopes::{DecayShape, Transient};
use murmur_core::filters::OnePoleLP;
use rand::Rng;

use super::{bipolar, chance, Generator, OUTPUT_LIMIT};
use crate::nodes::RandomWalk;

const BASE_ALPHA: f32 = 0.06;
const BASE_WEIGHT: f32 = 2.2;

const DROP_CHANCE: f32 = 0.002_5;
const DROP_FRAMES: (u32, u32) = (20, 90);
const DROP_INTENSITY: (f32, f32) = (0.2, 0.8);
const SPLASH_ALPHA: f32 = 0.45;
const SPLASH_WEIGHT: f32 = 0.9;

const RUMBLE_CHANCE: f32 = 0.000_02;
const RUMBLE_FRAMES: (u32, u32) = (6_000, 20_000);
const RUMBLE_INTENSITY: (f32, f32) = (0.4, 1.0);
const RUMBLE_ALPHA: f32 = 0.004;
const RUMBLE_WEIGHT: f32 = 3.5;

/// Rainfall: filtered wash, droplet splashes, the odd distant rumble, all
/// scaled by a slowly wandering intensity.
#[derive(Clone, Debug)]
pub struct Rainfall {
    base: OnePoleLP,
    drop: Transient,
    splash: OnePoleLP,
    rumble: Transient,
    rumble_gain: f32,
    rumble_lp: OnePoleLP,
    intensity: RandomWalk,
}

impl Rainfall {
    pub fn new() -> Self {
        Self {
            base: OnePoleLP::with_alpha(BASE_ALPHA),
            drop: Transient::new(DecayShape::Quadratic),
            splash: OnePoleLP::with_alpha(SPLASH_ALPHA),
            rumble: Transient::new(DecayShape::Linear),
            rumble_gain: 0.0,
            rumble_lp: OnePoleLP::with_alpha(RUMBLE_ALPHA),
            intensity: RandomWalk::new(0.3, 1.0, 0.65, 0.08, 400, 0.000_8),
        }
    }

    /// Rise-then-fall swell over the rumble's lifetime, peaking at its gain.
    #[inline]
    fn swell(&self) -> f32 {
        let p = self.rumble.progress();
        4.0 * p * (1.0 - p) * self.rumble_gain
    }

    /// Distant rumble. Silent, with a cleared filter, between events.
    #[inline]
    fn distant_rumble<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        if !self.rumble.is_active() {
            if !chance(rng, RUMBLE_CHANCE) {
                return 0.0;
            }
            let frames = rng.gen_range(RUMBLE_FRAMES.0..=RUMBLE_FRAMES.1);
            self.rumble.trigger(frames, 1.0);
            self.rumble_gain = rng.gen_range(RUMBLE_INTENSITY.0..RUMBLE_INTENSITY.1);
            self.rumble_lp.reset();
        }
        // The transient only times the rumble; its shape is the swell.
        let swell = self.swell();
        self.rumble.next();
        self.rumble_lp.process(bipolar(rng)) * RUMBLE_WEIGHT * swell
    }
}

impl Default for Rainfall {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Rainfall {
    fn reset(&mut self, _sr: f32) {
        self.base.reset();
        self.drop.reset();
        self.splash.reset();
        self.rumble.reset();
        self.rumble_gain = 0.0;
        self.rumble_lp.reset();
        self.intensity.reset();
    }

    #[inline]
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let wash = self.base.process(bipolar(rng)) * BASE_WEIGHT;

        if !self.drop.is_active() && chance(rng, DROP_CHANCE) {
            let frames = rng.gen_range(DROP_FRAMES.0..=DROP_FRAMES.1);
            self.drop.trigger(frames, rng.gen_range(DROP_INTENSITY.0..DROP_INTENSITY.1));
        }
        let drop = if self.drop.is_active() { self.drop.next() * bipolar(rng) } else { 0.0 };
        let splash = self.splash.process(drop) * SPLASH_WEIGHT;

        let rumble = self.distant_rumble(rng);

        let scale = self.intensity.next(rng);
        hard_clip((wash + splash + rumble) * scale, OUTPUT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::XorShift32;

    #[test]
    fn droplets_are_frequent() {
        let mut rng = XorShift32::new(12);
        let mut rain = Rainfall::new();
        let mut drops = 0;
        for _ in 0..44_100 {
            let was_active = rain.drop.is_active();
            rain.next(&mut rng);
            if !was_active && rain.drop.is_active() {
                drops += 1;
            }
        }
        assert!(drops > 40, "only {drops} droplets in one second");
    }

    #[test]
    fn intensity_wanders_within_bounds() {
        let mut rng = XorShift32::new(13);
        let mut rain = Rainfall::new();
        for _ in 0..200_000 {
            rain.next(&mut rng);
            let v = rain.intensity.value();
            assert!((0.3..=1.0).contains(&v), "intensity {v}");
        }
    }

    #[test]
    fn rumble_fades_to_silence_when_it_ends() {
        let mut rng = XorShift32::new(14);
        let mut rain = Rainfall::new();
        rain.rumble.trigger(RUMBLE_FRAMES.0, 1.0);
        rain.rumble_gain = 1.0;

        let mut peak = 0.0f32;
        let mut last = 0.0;
        while rain.rumble.is_active() {
            last = rain.distant_rumble(&mut rng);
            peak = peak.max(last.abs());
        }
        assert!(peak > 0.01, "rumble never audible: {peak}");
        assert!(last.abs() < 1e-3, "tail {last}");

        for _ in 0..100 {
            let v = rain.distant_rumble(&mut rng);
            assert!(v.abs() < 1e-3, "step after the rumble: {v}");
        }
    }
}
