//! Lock-free control block shared between the control context and the render
//! callback.
//!
//! The control side only ever stores; the render side loads once per block
//! and publishes a few counters back. Every value fits in one atomic word, so
//! neither side can observe a torn update and neither side ever waits.

use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};

use murmur_core::dsp::clamp;

use crate::source::MixConfiguration;

/// `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(v: f32) -> Self {
        Self(AtomicU32::new(v.to_bits()))
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }

    #[inline]
    pub fn store(&self, v: f32, order: Ordering) {
        self.0.store(v.to_bits(), order);
    }
}

/// One fade request: ramp the session gain to `target` over `frames`.
///
/// Requests are numbered; a newer generation replaces whatever fade the
/// renderer is running, starting from the gain it had reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FadeRequest {
    generation: u16,
    target_q: u16,
    frames: u32,
}

impl FadeRequest {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(generation: u16, target: f32, frames: u32) -> Self {
        let q = (clamp(target, 0.0, 1.0) * f32::from(u16::MAX)).round() as u16;
        Self { generation, target_q: q, frames }
    }

    #[inline] pub fn generation(&self) -> u16 { self.generation }
    #[inline] pub fn frames(&self) -> u32 { self.frames }

    #[inline]
    pub fn target(&self) -> f32 {
        f32::from(self.target_q) / f32::from(u16::MAX)
    }

    /// `generation:16 | target:16 | frames:32`, most significant first.
    #[inline]
    pub fn pack(&self) -> u64 {
        (u64::from(self.generation) << 48) | (u64::from(self.target_q) << 32) | u64::from(self.frames)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn unpack(bits: u64) -> Self {
        Self {
            generation: (bits >> 48) as u16,
            target_q: (bits >> 32) as u16,
            frames: bits as u32,
        }
    }
}

/// Per-session control block. Generation 0 means "no request yet".
#[derive(Debug)]
pub struct SharedControl {
    mix: AtomicU32,
    volume: AtomicF32,
    fade: AtomicU64,
    fade_done: AtomicU32,
    gain: AtomicF32,
    level: AtomicF32,
    frames_rendered: AtomicU64,
    next_generation: AtomicU16,
}

impl SharedControl {
    pub fn new(mix: MixConfiguration, volume: f32) -> Self {
        Self {
            mix: AtomicU32::new(mix.pack()),
            volume: AtomicF32::new(clamp(volume, 0.0, 1.0)),
            fade: AtomicU64::new(0),
            fade_done: AtomicU32::new(0),
            gain: AtomicF32::new(0.0),
            level: AtomicF32::new(0.0),
            frames_rendered: AtomicU64::new(0),
            next_generation: AtomicU16::new(1),
        }
    }

    // ---------------------------- control side --------------------------------

    #[inline]
    pub fn set_mix(&self, mix: MixConfiguration) {
        self.mix.store(mix.pack(), Ordering::Release);
    }

    #[inline]
    pub fn set_volume(&self, v: f32) {
        self.volume.store(clamp(v, 0.0, 1.0), Ordering::Release);
    }

    /// Post a fade and return its generation.
    pub fn request_fade(&self, target: f32, frames: u32) -> u16 {
        let mut generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        if generation == 0 {
            generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        }
        let req = FadeRequest::new(generation, target, frames);
        self.fade.store(req.pack(), Ordering::Release);
        generation
    }

    /// Generation of the most recently completed fade.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn fade_done(&self) -> u16 {
        self.fade_done.load(Ordering::Acquire) as u16
    }

    /// Fade gain as of the last rendered block.
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain.load(Ordering::Acquire)
    }

    /// Smoothed RMS of the output as of the last rendered block.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level.load(Ordering::Acquire)
    }

    #[inline]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Acquire)
    }

    // ---------------------------- render side ---------------------------------

    #[inline]
    pub fn mix(&self) -> MixConfiguration {
        MixConfiguration::unpack(self.mix_bits()).unwrap_or_default()
    }

    #[inline]
    pub fn mix_bits(&self) -> u32 {
        self.mix.load(Ordering::Acquire)
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume.load(Ordering::Acquire)
    }

    #[inline]
    pub fn fade_request(&self) -> Option<FadeRequest> {
        let req = FadeRequest::unpack(self.fade.load(Ordering::Acquire));
        (req.generation != 0).then_some(req)
    }

    #[inline]
    pub fn publish_fade_done(&self, generation: u16) {
        self.fade_done.store(u32::from(generation), Ordering::Release);
    }

    #[inline]
    pub fn publish_block(&self, gain: f32, level: f32, frames: u64) {
        self.gain.store(gain, Ordering::Release);
        self.level.store(level, Ordering::Release);
        self.frames_rendered.fetch_add(frames, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SoundKind;

    #[test]
    fn atomic_f32_keeps_bits() {
        let a = AtomicF32::new(0.25);
        assert_eq!(a.load(Ordering::Relaxed), 0.25);
        a.store(-1.5, Ordering::Relaxed);
        assert_eq!(a.load(Ordering::Relaxed), -1.5);
    }

    #[test]
    fn fade_request_packs_into_one_word() {
        let req = FadeRequest::new(7, 1.0, 12_000);
        let back = FadeRequest::unpack(req.pack());
        assert_eq!(back, req);
        assert_eq!(back.target(), 1.0);
        assert_eq!(FadeRequest::new(1, 0.0, 5).target(), 0.0);
        assert!((FadeRequest::new(1, 0.5, 5).target() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn generations_skip_zero() {
        let ctl = SharedControl::new(MixConfiguration::default(), 1.0);
        assert!(ctl.fade_request().is_none());
        ctl.next_generation.store(u16::MAX, Ordering::Relaxed);
        assert_eq!(ctl.request_fade(1.0, 10), u16::MAX);
        assert_eq!(ctl.request_fade(0.0, 10), 1);
        assert_eq!(ctl.fade_request().map(|r| r.generation()), Some(1));
    }

    #[test]
    fn mix_and_volume_round_trip() {
        let ctl = SharedControl::new(MixConfiguration::default(), 3.0);
        assert_eq!(ctl.volume(), 1.0);
        let mix = MixConfiguration::default().toggled(SoundKind::Birds).unwrap();
        ctl.set_mix(mix);
        assert_eq!(ctl.mix(), mix);
    }
}
