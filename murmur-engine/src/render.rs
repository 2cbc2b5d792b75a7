//! The render callback.
//!
//! A [`Renderer`] is moved into the output device when a session starts and
//! lives on the audio thread from then on. Per block it:
//! 1. picks up the mix snapshot and any new fade request (between frames),
//! 2. renders every frame: mixer → fade ramp → smoothed volume,
//! 3. publishes fade completion, the reached gain, the output level and the
//!    frame count.
//!
//! No allocation, no locks, no logging.

use std::sync::Arc;

use murmur_core::dsp::{hard_clip, one_pole_coeff_ms, Rms};
use murmur_core::envelopes::{LinearRamp, SlewLimiter};
use rand::SeedableRng;

use crate::config::EngineConfig;
use crate::control::SharedControl;
use crate::generators::GeneratorBank;
use crate::mixer::Mixer;
use crate::output::StreamFormat;
use crate::rng::XorShift32;
use crate::source::MixConfiguration;

/// Integration time of the output level meter.
const METER_MS: f32 = 50.0;

pub struct Renderer {
    shared: Arc<SharedControl>,
    bank: GeneratorBank,
    mixer: Mixer,
    rng: XorShift32,
    fade: LinearRamp,
    fade_generation: u16,
    volume: SlewLimiter,
    meter: Rms,
    mix_bits: u32,
    channels: usize,
}

impl Renderer {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(shared: Arc<SharedControl>, format: StreamFormat, config: &EngineConfig) -> Self {
        let sr = format.sample_rate.max(1) as f32;
        let mix = shared.mix();
        let rng = config.seed.map_or_else(XorShift32::from_entropy_seed, XorShift32::seed_from_u64);
        let mut volume = SlewLimiter::new(config.volume_smoothing_ms, sr);
        volume.reset(shared.volume());
        Self {
            bank: GeneratorBank::new(sr),
            mixer: Mixer::new(mix, config.policy, sr, config.layer_fade_ms, config.final_gain),
            rng,
            fade: LinearRamp::new(0.0).with_epsilon(config.fade_epsilon),
            fade_generation: 0,
            volume,
            meter: Rms::new(1.0 - one_pole_coeff_ms(METER_MS, sr)),
            mix_bits: mix.pack(),
            channels: usize::from(format.channels.max(1)),
            shared,
        }
    }

    #[inline] pub fn channels(&self) -> usize { self.channels }
    #[inline] pub fn sample_rate(&self) -> f32 { self.bank.sample_rate() }
    #[inline] pub fn gain(&self) -> f32 { self.fade.value() }
    #[inline] pub fn level(&self) -> f32 { self.meter.value() }
    #[inline] pub fn mix(&self) -> MixConfiguration { self.mixer.mix() }
    #[inline] pub fn mixer(&self) -> &Mixer { &self.mixer }

    /// Fill an interleaved `f32` buffer. Returns the number of frames written.
    #[inline]
    pub fn render(&mut self, out: &mut [f32]) -> usize {
        self.render_with(out, |s| s)
    }

    /// Fill an interleaved buffer of any sample type; `convert` maps a sample
    /// in [-1, 1] to the device format. Every channel of a frame carries the
    /// same (mono) sample.
    pub fn render_with<T: Copy>(&mut self, out: &mut [T], convert: impl Fn(f32) -> T) -> usize {
        self.sync();
        let target_volume = self.shared.volume();
        let mut finished = false;
        let mut frames = 0usize;
        for frame in out.chunks_mut(self.channels) {
            let tick = self.fade.next();
            finished |= tick.finished;
            let v = self.volume.process(target_volume);
            let s = hard_clip(self.mixer.next(&mut self.bank, &mut self.rng) * tick.value * v, 1.0);
            self.meter.tick(s);
            frame.fill(convert(s));
            frames += 1;
        }
        if finished {
            self.shared.publish_fade_done(self.fade_generation);
        }
        self.shared.publish_block(self.fade.value(), self.meter.value(), frames as u64);
        frames
    }

    /// Apply control changes. Called once per block, before the first frame.
    fn sync(&mut self) {
        let bits = self.shared.mix_bits();
        if bits != self.mix_bits {
            self.mix_bits = bits;
            if let Some(mix) = MixConfiguration::unpack(bits) {
                self.mixer.apply(mix, &mut self.bank);
            }
        }
        if let Some(req) = self.shared.fade_request() {
            if req.generation() != self.fade_generation {
                self.fade_generation = req.generation();
                if self.fade.retarget(req.target(), req.frames()) {
                    self.shared.publish_fade_done(req.generation());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SoundKind;

    const FORMAT: StreamFormat = StreamFormat { sample_rate: 48_000, channels: 2 };

    fn renderer(mix: MixConfiguration) -> (Arc<SharedControl>, Renderer) {
        let shared = Arc::new(SharedControl::new(mix, 1.0));
        let config = EngineConfig::default().with_seed(42);
        let r = Renderer::new(Arc::clone(&shared), FORMAT, &config);
        (shared, r)
    }

    #[test]
    fn silent_until_a_fade_is_requested() {
        let (_, mut r) = renderer(MixConfiguration::default());
        let mut buf = [1.0f32; 512];
        assert_eq!(r.render(&mut buf), 256);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn frames_are_duplicated_across_channels() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        shared.request_fade(1.0, 0);
        let mut buf = [0.0f32; 512];
        r.render(&mut buf);
        for frame in buf.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(buf.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn fade_completion_is_published_once_per_generation() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        let generation = shared.request_fade(1.0, 1_000);
        let mut buf = [0.0f32; 2 * 256];
        r.render(&mut buf);
        assert_eq!(shared.fade_done(), 0);
        for _ in 0..4 { r.render(&mut buf); }
        assert_eq!(shared.fade_done(), generation);
        assert_eq!(shared.gain(), 1.0);
        assert_eq!(shared.frames_rendered(), 5 * 256);
    }

    #[test]
    fn level_meter_follows_the_output() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        let mut buf = [0.0f32; 2 * 480];
        r.render(&mut buf);
        assert_eq!(shared.level(), 0.0);

        shared.request_fade(1.0, 0);
        for _ in 0..50 { r.render(&mut buf); }
        assert_eq!(shared.level(), r.level());
        // uniform[-0.5, 0.5] at the 0.8 final gain
        assert!((r.level() - 0.289 * 0.8).abs() < 0.03, "level {}", r.level());
    }

    #[test]
    fn snapped_fade_completes_immediately() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        let generation = shared.request_fade(0.0, 10_000);
        let mut buf = [0.0f32; 2];
        r.render(&mut buf);
        assert_eq!(shared.fade_done(), generation);
    }

    #[test]
    fn new_request_reverses_from_reached_gain() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        shared.request_fade(1.0, 1_000);
        let mut buf = [0.0f32; 2 * 300];
        r.render(&mut buf);
        let reached = r.gain();
        assert!(reached > 0.25 && reached < 0.35, "reached {reached}");

        let out = shared.request_fade(0.0, 1_000);
        let mut one = [0.0f32; 2];
        r.render(&mut one);
        assert!(r.gain() < reached && r.gain() > 0.25);
        for _ in 0..4 { r.render(&mut buf); }
        assert_eq!(r.gain(), 0.0);
        assert_eq!(shared.fade_done(), out);
    }

    #[test]
    fn mix_changes_land_between_blocks() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        shared.request_fade(1.0, 0);
        let fire = MixConfiguration::default().toggled(SoundKind::Fire).unwrap();
        shared.set_mix(fire);
        assert!(!r.mixer().is_live(SoundKind::Fire));
        let mut buf = [0.0f32; 64];
        r.render(&mut buf);
        assert_eq!(r.mix(), fire);
        assert!(r.mixer().is_live(SoundKind::Fire));
    }

    #[test]
    fn output_respects_volume() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        shared.request_fade(1.0, 0);
        shared.set_volume(0.0);
        let mut buf = [0.0f32; 2 * 48_000];
        r.render(&mut buf);
        let tail = &buf[buf.len() - 200..];
        assert!(tail.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn converts_to_integer_formats() {
        let (shared, mut r) = renderer(MixConfiguration::default());
        shared.request_fade(1.0, 0);
        let mut buf = [0i16; 128];
        #[allow(clippy::cast_possible_truncation)]
        let n = r.render_with(&mut buf, |s| (s * f32::from(i16::MAX)) as i16);
        assert_eq!(n, 64);
        assert!(buf.iter().any(|&s| s != 0));
    }
}
