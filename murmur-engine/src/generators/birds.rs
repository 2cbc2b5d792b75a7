use murmur_core::dsp::{hard_clip, lerp};
use murmur_core::envelopes::{DecayShape, Transient};
use murmur_core::filters::OnePoleLP;
use rand::Rng;

use super::{attack, bipolar, chance, Generator, OUTPUT_LIMIT};
use crate::nodes::Osc;

const CALL_CHANCE: f32 = 0.000_35;
const CALL_FRAMES: (u32, u32) = (900, 3_200);
const CALL_INTENSITY: (f32, f32) = (0.35, 0.8);
const CALL_PITCH: (f32, f32) = (2_200.0, 4_200.0);
const WARBLE_HZ: (f32, f32) = (6.0, 14.0);
const WARBLE_DEPTH: f32 = 0.04;
const GLIDE: f32 = 0.15;
const ATTACK_FRAMES: u32 = 60;

const DISTANT_CHANCE: f32 = 0.000_12;
const DISTANT_FRAMES: (u32, u32) = (1_500, 4_000);
const DISTANT_INTENSITY: (f32, f32) = (0.1, 0.25);
const DISTANT_PITCH: (f32, f32) = (1_400.0, 2_200.0);

const CHIRP_CHANCE: f32 = 0.000_4;
const CHIRP_FRAMES: (u32, u32) = (150, 450);
const CHIRP_INTENSITY: (f32, f32) = (0.2, 0.5);
const CHIRP_PITCH: (f32, f32) = (3_200.0, 5_500.0);
const CHIRP_SWEEP: f32 = 0.5;

const FLUTTER_CHANCE: f32 = 0.000_08;
const FLUTTER_FRAMES: (u32, u32) = (400, 1_200);
const FLUTTER_INTENSITY: (f32, f32) = (0.08, 0.2);
const FLUTTER_HZ: (f32, f32) = (18.0, 26.0);

const SMOOTH_ALPHA: f32 = 0.35;

/// A warbled, gliding song phrase with a second harmonic.
#[derive(Clone, Debug)]
struct Call {
    env: Transient,
    melody: Osc,
    harmonic: Osc,
    warble: Osc,
}

impl Call {
    fn new() -> Self {
        Self {
            env: Transient::new(DecayShape::Linear),
            melody: Osc::new(),
            harmonic: Osc::new(),
            warble: Osc::new(),
        }
    }

    fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, sr: f32, frames: (u32, u32), intensity: (f32, f32), pitch: (f32, f32)) {
        let hz = rng.gen_range(pitch.0..pitch.1);
        self.melody.set_freq(hz, sr);
        self.harmonic.set_freq(hz * 2.0, sr);
        self.warble.set_freq(rng.gen_range(WARBLE_HZ.0..WARBLE_HZ.1), sr);
        let n = rng.gen_range(frames.0..=frames.1);
        self.env.trigger(n, rng.gen_range(intensity.0..intensity.1));
    }

    #[inline]
    fn next(&mut self) -> f32 {
        if !self.env.is_active() {
            return 0.0;
        }
        let w = self.warble.next();
        let ratio = (1.0 + WARBLE_DEPTH * w) * lerp(1.0, 1.0 + GLIDE, self.env.progress());
        let m = self.melody.next_with_ratio(ratio);
        let h = self.harmonic.next_with_ratio(ratio);
        let tone = 0.65 * m + 0.25 * h + 0.1 * m * w;
        let fade_in = attack(self.env.elapsed(), ATTACK_FRAMES);
        tone * self.env.next() * fade_in
    }

    fn reset(&mut self) {
        self.env.reset();
        self.melody.reset();
        self.harmonic.reset();
        self.warble.reset();
    }
}

/// Morning birds: a foreground call, a quieter distant one, quick chirps and
/// the occasional wing flutter.
#[derive(Clone, Debug)]
pub struct Birdsong {
    sr: f32,
    call: Call,
    distant: Call,
    chirp: Transient,
    chirp_osc: Osc,
    flutter: Transient,
    flutter_osc: Osc,
    smooth: OnePoleLP,
}

impl Birdsong {
    pub fn new(sr: f32) -> Self {
        Self {
            sr: sr.max(1.0),
            call: Call::new(),
            distant: Call::new(),
            chirp: Transient::new(DecayShape::Quadratic),
            chirp_osc: Osc::new(),
            flutter: Transient::new(DecayShape::Linear),
            flutter_osc: Osc::new(),
            smooth: OnePoleLP::with_alpha(SMOOTH_ALPHA),
        }
    }
}

impl Generator for Birdsong {
    fn reset(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.call.reset();
        self.distant.reset();
        self.chirp.reset();
        self.chirp_osc.reset();
        self.flutter.reset();
        self.flutter_osc.reset();
        self.smooth.reset();
    }

    #[inline]
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let sr = self.sr;

        if !self.call.env.is_active() && chance(rng, CALL_CHANCE) {
            self.call.start(rng, sr, CALL_FRAMES, CALL_INTENSITY, CALL_PITCH);
        }
        if !self.distant.env.is_active() && chance(rng, DISTANT_CHANCE) {
            self.distant.start(rng, sr, DISTANT_FRAMES, DISTANT_INTENSITY, DISTANT_PITCH);
        }
        if !self.chirp.is_active() && chance(rng, CHIRP_CHANCE) {
            self.chirp_osc.set_freq(rng.gen_range(CHIRP_PITCH.0..CHIRP_PITCH.1), sr);
            let n = rng.gen_range(CHIRP_FRAMES.0..=CHIRP_FRAMES.1);
            self.chirp.trigger(n, rng.gen_range(CHIRP_INTENSITY.0..CHIRP_INTENSITY.1));
        }
        if !self.flutter.is_active() && chance(rng, FLUTTER_CHANCE) {
            self.flutter_osc.set_freq(rng.gen_range(FLUTTER_HZ.0..FLUTTER_HZ.1), sr);
            let n = rng.gen_range(FLUTTER_FRAMES.0..=FLUTTER_FRAMES.1);
            self.flutter.trigger(n, rng.gen_range(FLUTTER_INTENSITY.0..FLUTTER_INTENSITY.1));
        }

        let mut y = self.call.next() + self.distant.next();

        if self.chirp.is_active() {
            let sweep = 1.0 + CHIRP_SWEEP * self.chirp.progress();
            y += self.chirp_osc.next_with_ratio(sweep) * self.chirp.next();
        }
        if self.flutter.is_active() {
            let beat = self.flutter_osc.next().abs();
            y += bipolar(rng) * beat * self.flutter.next();
        }

        hard_clip(self.smooth.process(y), OUTPUT_LIMIT)
    }
}
