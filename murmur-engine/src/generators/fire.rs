use murmur_core::dsp::hard_clip;
use murmur_core::envelopes::{DecayShape, Transient};
use murmur_core::filters::OnePoleLP;
use rand::Rng;

use super::{bipolar, chance, Generator, OUTPUT_LIMIT};

// Body of the fire: a slow rumble and a brighter hiss from the same noise.
const RUMBLE_ALPHA: f32 = 0.012;
const HISS_ALPHA: f32 = 0.2;
const RUMBLE_WEIGHT: f32 = 2.6;
const HISS_WEIGHT: f32 = 0.35;

// Pops: short, sharp bursts (quadratic decay).
const POP_CHANCE: f32 = 0.000_6;
const POP_FRAMES: (u32, u32) = (20, 160);
const POP_INTENSITY: (f32, f32) = (0.3, 0.9);

// Snaps: rarer, longer, softer tail (linear decay).
const SNAP_CHANCE: f32 = 0.000_25;
const SNAP_FRAMES: (u32, u32) = (60, 240);
const SNAP_INTENSITY: (f32, f32) = (0.2, 0.6);
const SNAP_WEIGHT: f32 = 0.8;

// Crackle texture: a new random level every CRACKLE_PERIOD frames, smoothed.
const CRACKLE_PERIOD: u32 = 48;
const CRACKLE_ALPHA: f32 = 0.05;
const CRACKLE_WEIGHT: f32 = 0.25;

/// Campfire: rumble + hiss + two independent pop timers + crackle texture.
#[derive(Clone, Debug)]
pub struct FireCrackle {
    rumble: OnePoleLP,
    hiss: OnePoleLP,
    pop: Transient,
    snap: Transient,
    crackle_phase: u32,
    crackle_target: f32,
    crackle: OnePoleLP,
}

impl FireCrackle {
    pub fn new() -> Self {
        Self {
            rumble: OnePoleLP::with_alpha(RUMBLE_ALPHA),
            hiss: OnePoleLP::with_alpha(HISS_ALPHA),
            pop: Transient::new(DecayShape::Quadratic),
            snap: Transient::new(DecayShape::Linear),
            crackle_phase: 0,
            crackle_target: 0.0,
            crackle: OnePoleLP::with_alpha(CRACKLE_ALPHA),
        }
    }
}

impl Default for FireCrackle {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for FireCrackle {
    fn reset(&mut self, _sr: f32) {
        self.rumble.reset();
        self.hiss.reset();
        self.pop.reset();
        self.snap.reset();
        self.crackle_phase = 0;
        self.crackle_target = 0.0;
        self.crackle.reset();
    }

    #[inline]
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let n = bipolar(rng);
        let body = self.rumble.process(n) * RUMBLE_WEIGHT + self.hiss.process(n) * HISS_WEIGHT;

        if !self.pop.is_active() && chance(rng, POP_CHANCE) {
            let frames = rng.gen_range(POP_FRAMES.0..=POP_FRAMES.1);
            self.pop.trigger(frames, rng.gen_range(POP_INTENSITY.0..POP_INTENSITY.1));
        }
        if !self.snap.is_active() && chance(rng, SNAP_CHANCE) {
            let frames = rng.gen_range(SNAP_FRAMES.0..=SNAP_FRAMES.1);
            self.snap.trigger(frames, rng.gen_range(SNAP_INTENSITY.0..SNAP_INTENSITY.1));
        }
        let pops = if self.pop.is_active() || self.snap.is_active() {
            (self.pop.next() + self.snap.next() * SNAP_WEIGHT) * bipolar(rng)
        } else {
            0.0
        };

        self.crackle_phase += 1;
        if self.crackle_phase >= CRACKLE_PERIOD {
            self.crackle_phase = 0;
            self.crackle_target = bipolar(rng) * 0.5;
        }
        let crackle = self.crackle.process(self.crackle_target) * CRACKLE_WEIGHT;

        hard_clip(body + pops + crackle, OUTPUT_LIMIT)
    }
}
